//! Error type for the simulator facade and frame scheduler.

use fathom_core::FieldError;
use thiserror::Error;

/// Errors produced by [`crate::simulator::Simulator`] control-surface
/// operations and the frame scheduler.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A preset was requested by name that does not match any known
    /// preset.
    #[error("unknown damping preset: {0}")]
    UnknownPreset(String),

    /// A field mutation was rejected.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The scheduler's computed substep count for this frame exceeded the
    /// hard cap and was truncated. This is reported, not fatal: the frame
    /// proceeds with `capped` substeps.
    #[error("substep count {requested} exceeds the cap, truncated to {capped}")]
    Overload {
        /// The substep count the CFL computation actually called for.
        requested: u32,
        /// The substep count the frame was truncated to.
        capped: u32,
    },

    /// The GPU backend failed mid-frame; the engine has reverted to the
    /// CPU path for subsequent frames.
    #[cfg(feature = "gpu")]
    #[error("GPU backend failed, reverted to CPU: {0}")]
    BackendFailure(#[from] fathom_gpu::GpuError),
}
