//! Core 2D acoustic FDTD primitives: the pressure field, the leapfrog
//! stepper, continuous sources, and listener probes.
//!
//! This crate has no knowledge of audio devices, GPUs, or CLIs — it is the
//! numerical heart shared by every other crate in the workspace. It is
//! `no_std` (with `alloc`) by default so it can be built for embedded or
//! WASM targets that need the stepper without the rest of the stack; enable
//! the `std` feature (on by default for workspace members) for
//! `std::error::Error` impls.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod active_region;
pub mod error;
pub mod field;
pub mod listener;
pub mod params;
pub mod preset;
pub mod sample;
pub mod source;
pub mod stepper;

pub use active_region::ActiveRegion;
pub use error::FieldError;
pub use field::Field;
pub use listener::Listener;
pub use params::{SimParams, CFL_SAFETY};
pub use preset::{DampingPreset, PresetKind};
pub use sample::Sample;
pub use source::{ContinuousSource, SourceHandle, SourcePool};
pub use stepper::step_cpu;
