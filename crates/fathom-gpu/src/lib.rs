//! wgpu compute backend for the fathom FDTD stepper.
//!
//! Mirrors [`fathom_core::stepper::step_cpu`] as a pair of WGSL compute
//! entry points dispatched over an active window, with the same leapfrog
//! coefficients and boundary handling. A frame's `N` substeps are encoded
//! as `N` command buffers up front and submitted in a single batch, so the
//! host synchronizes with the device exactly twice per frame: once to
//! upload the initial state, once to download the result.

mod backend;
mod error;
mod pipelines;
mod types;

pub use backend::{GpuBackend, GpuFramePlan};
pub use error::GpuError;
pub use types::{GpuAudioSource, StepParams, MAX_SOURCES_PER_STEP, MAX_SUBSTEPS};
