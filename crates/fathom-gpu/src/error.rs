//! Error type for GPU adapter acquisition and frame encoding.

use thiserror::Error;

/// Errors produced by [`crate::backend::GpuBackend`].
#[derive(Debug, Error)]
pub enum GpuError {
    /// No compatible GPU adapter is present on this system.
    #[error("no compatible GPU adapter is available")]
    Unavailable,

    /// The adapter was found but device creation failed.
    #[error("failed to request a GPU device: {0}")]
    AdapterRequestFailed(String),

    /// Command encoding or submission failed mid-frame.
    #[error("GPU frame encode failed: {0}")]
    EncodeFailed(String),
}
