//! The GPU backend: keeps the field on-device across all substeps of a
//! frame, synchronizing with the host exactly twice (upload, download).

use fathom_core::{DampingPreset, Field, SimParams, SourcePool};

use crate::error::GpuError;
use crate::pipelines::{self, aligned_stride};
use crate::types::{GpuAudioSource, StepParams, MAX_SOURCES_PER_STEP, MAX_SUBSTEPS};

/// One frame's worth of planning the engine hands in: substep count, the
/// fixed timestep, and the active window to dispatch over.
#[derive(Debug, Clone, Copy)]
pub struct GpuFramePlan {
    /// Number of substeps to encode this frame.
    pub n: u32,
    /// Per-substep timestep.
    pub dt: f32,
    /// Listener grid coordinates, or `None` if disabled.
    pub listener: Option<(u32, u32)>,
    /// Active window: `(offset_x, offset_y, width, height)`.
    pub active_window: (u32, u32, u32, u32),
}

/// Owns every GPU resource for one field size and drives the frame
/// protocol: upload once, encode N substeps without dispatching, commit
/// and wait once, download once.
pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    width: u32,
    height: u32,
    triple_buffer: wgpu::Buffer,
    obstacle_buffer: wgpu::Buffer,
    listener_buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,
    source_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    step_pipeline: wgpu::ComputePipeline,
    boundary_rows_pipeline: wgpu::ComputePipeline,
    boundary_columns_pipeline: wgpu::ComputePipeline,
    staging_field: wgpu::Buffer,
    staging_listener: wgpu::Buffer,
}

impl GpuBackend {
    /// Requests a GPU adapter and device and allocates every buffer for a
    /// `width x height` field.
    ///
    /// # Errors
    ///
    /// Returns [`GpuError::Unavailable`] if no adapter is found, or
    /// [`GpuError::AdapterRequestFailed`] if device creation fails.
    pub fn try_new(width: u32, height: u32) -> Result<Self, GpuError> {
        pollster::block_on(Self::try_new_async(width, height))
    }

    async fn try_new_async(width: u32, height: u32) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| GpuError::Unavailable)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("fathom-gpu device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| GpuError::AdapterRequestFailed(e.to_string()))?;

        let (triple_buffer, obstacle_buffer, listener_buffer) =
            pipelines::create_field_buffers(&device, width, height);
        let (params_buffer, source_buffer) = pipelines::create_step_buffers(&device);
        let (step_pipeline, boundary_rows_pipeline, boundary_columns_pipeline, bind_group_layout) =
            pipelines::create_pipelines(&device);
        let bind_group = pipelines::create_bind_group(
            &device,
            &bind_group_layout,
            &triple_buffer,
            &obstacle_buffer,
            &listener_buffer,
            &params_buffer,
            &source_buffer,
        );

        let cell_bytes = (width as u64) * (height as u64) * 4;
        // holds both the downloaded `cur` and `prev` slots, back to back
        let staging_field = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("fathom staging field"),
            size: cell_bytes * 2,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let staging_listener = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("fathom staging listener"),
            size: (MAX_SUBSTEPS as u64) * 4,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Ok(Self {
            device,
            queue,
            width,
            height,
            triple_buffer,
            obstacle_buffer,
            listener_buffer,
            params_buffer,
            source_buffer,
            bind_group,
            step_pipeline,
            boundary_rows_pipeline,
            boundary_columns_pipeline,
            staging_field,
            staging_listener,
        })
    }

    fn workgroup_counts(active_width: u32, active_height: u32) -> (u32, u32) {
        (active_width.div_ceil(16), active_height.div_ceil(16))
    }

    /// Runs one frame of `plan.n` substeps entirely on-device, following
    /// the protocol: upload, fill all per-step records, encode all N
    /// command buffers without dispatching them early, commit everything
    /// in one submission, wait once, then download the final state back
    /// into `field` and return the frame's listener samples.
    ///
    /// # Errors
    ///
    /// Returns [`GpuError::EncodeFailed`] if buffer mapping for the
    /// download fails.
    pub fn run_frame(
        &mut self,
        field: &mut Field,
        sources: &mut SourcePool,
        preset: &DampingPreset,
        sim_params: &SimParams,
        plan: &GpuFramePlan,
    ) -> Result<Vec<f32>, GpuError> {
        self.upload_initial_state(field);

        let params_stride = aligned_stride(core::mem::size_of::<StepParams>());
        let source_stride =
            aligned_stride(core::mem::size_of::<GpuAudioSource>() * MAX_SOURCES_PER_STEP);

        let k = sim_params.courant_squared(plan.dt);
        let abc_a = (sim_params.c * plan.dt / sim_params.dx).min(1.0);
        let (offset_x, offset_y, active_width, active_height) = plan.active_window;

        // matches `fathom_core::field::BufferIndices::initial()`
        let mut prev_idx = 0u32;
        let mut cur_idx = 1u32;
        let mut next_idx = 2u32;

        // Step 3: fill every per-step record before dispatching anything.
        for step in 0..plan.n {
            let mut source_records = [GpuAudioSource::default(); MAX_SOURCES_PER_STEP];
            let mut count = 0usize;
            for (_, source) in sources.iter_mut() {
                if count >= MAX_SOURCES_PER_STEP {
                    break;
                }
                let pressure = source.sample_for_step(plan.dt);
                let (x, y) = source.position_xy();
                source_records[count] = GpuAudioSource {
                    x,
                    y,
                    pressure,
                    _pad: 0.0,
                };
                count += 1;
            }

            let step_params = StepParams {
                width: self.width,
                height: self.height,
                k,
                d: preset.d,
                r: preset.r,
                two_d: preset.two_d(),
                prev_idx,
                cur_idx,
                next_idx,
                listener_x: plan.listener.map_or(-1, |(x, _)| x as i32),
                listener_y: plan.listener.map_or(-1, |(_, y)| y as i32),
                sub_step_idx: step,
                source_count: count as u32,
                offset_x,
                offset_y,
                active_width,
                active_height,
                is_absorbing: u32::from(preset.is_absorbing()),
                abc_a,
                _pad: 0,
            };

            self.queue.write_buffer(
                &self.params_buffer,
                step as u64 * params_stride,
                bytemuck::bytes_of(&step_params),
            );
            self.queue.write_buffer(
                &self.source_buffer,
                step as u64 * source_stride,
                bytemuck::cast_slice(&source_records),
            );

            // mirrors `BufferIndices::rotate`: prev' = cur, cur' = next, next' = prev
            let (new_prev, new_cur, new_next) = (cur_idx, next_idx, prev_idx);
            prev_idx = new_prev;
            cur_idx = new_cur;
            next_idx = new_next;
        }
        let final_cur_idx = cur_idx;
        let final_prev_idx = prev_idx;

        // Step 4+5: encode every substep's command buffer, commit once.
        let mut command_buffers = Vec::with_capacity(plan.n as usize * 3);
        let (wg_x, wg_y) = Self::workgroup_counts(active_width, active_height);

        for step in 0..plan.n {
            let offsets = [
                (step as u64 * params_stride) as u32,
                (step as u64 * source_stride) as u32,
            ];

            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("fathom substep encoder"),
                });

            {
                let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("fathom step_substep pass"),
                    timestamp_writes: None,
                });
                pass.set_pipeline(&self.step_pipeline);
                pass.set_bind_group(0, &self.bind_group, &offsets);
                pass.dispatch_workgroups(wg_x, wg_y, 1);
            }
            // Two separate passes, in order: the column pass's corner writes
            // depend on the row pass's output at the top/bottom-row corners
            // having already landed (see step.wgsl's module comment).
            {
                let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("fathom resolve_boundary_rows pass"),
                    timestamp_writes: None,
                });
                pass.set_pipeline(&self.boundary_rows_pipeline);
                pass.set_bind_group(0, &self.bind_group, &offsets);
                pass.dispatch_workgroups(wg_x, wg_y, 1);
            }
            {
                let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("fathom resolve_boundary_columns pass"),
                    timestamp_writes: None,
                });
                pass.set_pipeline(&self.boundary_columns_pipeline);
                pass.set_bind_group(0, &self.bind_group, &offsets);
                pass.dispatch_workgroups(wg_x, wg_y, 1);
            }

            command_buffers.push(encoder.finish());
        }

        self.queue.submit(command_buffers);
        self.device.poll(wgpu::Maintain::Wait).panic_on_timeout();

        self.download_result(field, final_cur_idx, final_prev_idx, plan.n)
    }

    fn upload_initial_state(&self, field: &Field) {
        let cell_bytes = (self.width as u64) * (self.height as u64) * 4;

        // matches the initial `BufferIndices`: slot 0 = prev, slot 1 = cur
        self.queue.write_buffer(
            &self.triple_buffer,
            0,
            bytemuck::cast_slice(field.pressure_prev()),
        );
        self.queue.write_buffer(
            &self.triple_buffer,
            cell_bytes,
            bytemuck::cast_slice(field.pressure()),
        );

        let obstacle_u32: Vec<u32> = field.obstacles().iter().map(|&b| u32::from(b)).collect();
        self.queue
            .write_buffer(&self.obstacle_buffer, 0, bytemuck::cast_slice(&obstacle_u32));
    }

    fn download_result(
        &mut self,
        field: &mut Field,
        cur_idx: u32,
        prev_idx: u32,
        n: u32,
    ) -> Result<Vec<f32>, GpuError> {
        let cell_bytes = (self.width as u64) * (self.height as u64) * 4;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("fathom download encoder"),
            });
        encoder.copy_buffer_to_buffer(
            &self.triple_buffer,
            cur_idx as u64 * cell_bytes,
            &self.staging_field,
            0,
            cell_bytes,
        );
        encoder.copy_buffer_to_buffer(
            &self.triple_buffer,
            prev_idx as u64 * cell_bytes,
            &self.staging_field,
            cell_bytes,
            cell_bytes,
        );
        encoder.copy_buffer_to_buffer(
            &self.listener_buffer,
            0,
            &self.staging_listener,
            0,
            (n as u64) * 4,
        );
        self.queue.submit([encoder.finish()]);

        let field_data = self.map_and_read(&self.staging_field, cell_bytes * 2)?;
        let listener_data = self.map_and_read(&self.staging_listener, (n as u64) * 4)?;

        let cur: &[f32] = bytemuck::cast_slice(&field_data[..cell_bytes as usize]);
        let prev: &[f32] = bytemuck::cast_slice(&field_data[cell_bytes as usize..]);
        field.load_gpu_result(cur, prev);

        Ok(bytemuck::cast_slice(&listener_data).to_vec())
    }

    fn map_and_read(&self, buffer: &wgpu::Buffer, size: u64) -> Result<Vec<u8>, GpuError> {
        let slice = buffer.slice(..size);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait).panic_on_timeout();
        rx.recv()
            .map_err(|e| GpuError::EncodeFailed(e.to_string()))?
            .map_err(|e| GpuError::EncodeFailed(e.to_string()))?;
        let data = slice.get_mapped_range().to_vec();
        drop(slice);
        buffer.unmap();
        Ok(data)
    }
}
