//! `repr(C)` structs shared with the WGSL shader, matching `StepParams` and
//! `AudioSource` in `shaders/step.wgsl` field-for-field.

/// Maximum substeps a single GPU frame can encode, matching
/// `fathom_engine::scheduler::MAX_SUBSTEPS`. Kept as a local constant
/// rather than a dependency on `fathom-engine` to avoid a cyclic crate
/// dependency (`fathom-engine` depends on `fathom-gpu`, not the reverse).
pub const MAX_SUBSTEPS: usize = 1500;

/// Maximum simultaneously-playing audio sources accounted for in one
/// substep's source table.
pub const MAX_SOURCES_PER_STEP: usize = 16;

/// One substep's worth of parameters, uploaded once per frame as an array
/// of `MAX_SUBSTEPS` records.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StepParams {
    pub width: u32,
    pub height: u32,
    pub k: f32,
    pub d: f32,
    pub r: f32,
    pub two_d: f32,
    pub prev_idx: u32,
    pub cur_idx: u32,
    pub next_idx: u32,
    pub listener_x: i32,
    pub listener_y: i32,
    pub sub_step_idx: u32,
    pub source_count: u32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub active_width: u32,
    pub active_height: u32,
    pub is_absorbing: u32,
    pub abc_a: f32,
    pub _pad: u32,
}

/// One audio source's per-substep injection record.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuAudioSource {
    pub x: u32,
    pub y: u32,
    pub pressure: f32,
    pub _pad: f32,
}
