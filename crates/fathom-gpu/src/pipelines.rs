//! GPU resource creation: buffers, bind group layout, and compute
//! pipelines for the step and boundary-resolve passes.

const STEP_SHADER_SOURCE: &str = include_str!("shaders/step.wgsl");

/// Device-side byte offset alignment the backend pads dynamic-offset
/// records to, matching wgpu's default `min_storage_buffer_offset_alignment`.
pub(crate) const DYNAMIC_OFFSET_ALIGNMENT: u64 = 256;

pub(crate) fn aligned_stride(size: usize) -> u64 {
    let size = size as u64;
    size.div_ceil(DYNAMIC_OFFSET_ALIGNMENT) * DYNAMIC_OFFSET_ALIGNMENT
}

/// Creates the triple-buffer (3 x W x H floats), obstacle mask, and
/// listener-sample device buffers.
pub(crate) fn create_field_buffers(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Buffer, wgpu::Buffer, wgpu::Buffer) {
    let cell_count = (width as u64) * (height as u64);

    let triple_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("fathom triple buffer"),
        size: 3 * cell_count * 4,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    });

    let obstacle_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("fathom obstacle mask"),
        size: cell_count * 4,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let listener_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("fathom listener samples"),
        size: (crate::types::MAX_SUBSTEPS as u64) * 4,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    });

    (triple_buffer, obstacle_buffer, listener_buffer)
}

/// Creates the per-substep parameter and source-table buffers, sized for
/// `MAX_SUBSTEPS` dynamic-offset records.
pub(crate) fn create_step_buffers(device: &wgpu::Device) -> (wgpu::Buffer, wgpu::Buffer) {
    let params_stride = aligned_stride(core::mem::size_of::<crate::types::StepParams>());
    let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("fathom step params"),
        size: params_stride * crate::types::MAX_SUBSTEPS as u64,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let source_record_size = core::mem::size_of::<crate::types::GpuAudioSource>()
        * crate::types::MAX_SOURCES_PER_STEP;
    let source_stride = aligned_stride(source_record_size);
    let source_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("fathom step source tables"),
        size: source_stride * crate::types::MAX_SUBSTEPS as u64,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    (params_buffer, source_buffer)
}

/// Creates the bind group layout shared by every compute entry point, and
/// the three pipelines (`step_substep`, `resolve_boundary_rows`,
/// `resolve_boundary_columns`).
pub(crate) fn create_pipelines(
    device: &wgpu::Device,
) -> (
    wgpu::ComputePipeline,
    wgpu::ComputePipeline,
    wgpu::ComputePipeline,
    wgpu::BindGroupLayout,
) {
    let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fathom step shader"),
        source: wgpu::ShaderSource::Wgsl(STEP_SHADER_SOURCE.into()),
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("fathom step bind group layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: false },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: false },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: true,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 4,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: true,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("fathom step pipeline layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let step_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some("fathom step_substep pipeline"),
        layout: Some(&pipeline_layout),
        module: &shader_module,
        entry_point: Some("step_substep"),
        compilation_options: wgpu::PipelineCompilationOptions::default(),
        cache: None,
    });

    let boundary_rows_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some("fathom resolve_boundary_rows pipeline"),
        layout: Some(&pipeline_layout),
        module: &shader_module,
        entry_point: Some("resolve_boundary_rows"),
        compilation_options: wgpu::PipelineCompilationOptions::default(),
        cache: None,
    });

    let boundary_columns_pipeline =
        device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("fathom resolve_boundary_columns pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader_module,
            entry_point: Some("resolve_boundary_columns"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

    (
        step_pipeline,
        boundary_rows_pipeline,
        boundary_columns_pipeline,
        bind_group_layout,
    )
}

/// Creates the single bind group reused for every substep, with dynamic
/// offsets selecting that substep's parameter record and source table at
/// dispatch time.
pub(crate) fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    triple_buffer: &wgpu::Buffer,
    obstacle_buffer: &wgpu::Buffer,
    listener_buffer: &wgpu::Buffer,
    params_buffer: &wgpu::Buffer,
    source_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    let params_stride = aligned_stride(core::mem::size_of::<crate::types::StepParams>());
    let source_stride = aligned_stride(
        core::mem::size_of::<crate::types::GpuAudioSource>() * crate::types::MAX_SOURCES_PER_STEP,
    );

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("fathom step bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: triple_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: obstacle_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: listener_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: params_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(params_stride),
                }),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: source_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(source_stride),
                }),
            },
        ],
    })
}
