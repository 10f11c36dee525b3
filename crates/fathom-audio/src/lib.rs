//! Audio bridge, device I/O, and file-decode ingest for the fathom
//! acoustic solver.
//!
//! This crate is the only place in the workspace that talks to an audio
//! device or an audio file format; `fathom-core` and `fathom-engine` only
//! ever see a listener's `Vec<f32>` of pressure samples or a decoded
//! [`fathom_core::Sample`]. See spec.md §6/§7 for the external-interface
//! and error-kind contracts this crate implements.

mod bridge;
mod decode;
mod device;
mod error;
mod ring;

pub use bridge::AudioBridge;
pub use decode::{AudioFileSource, EmptyRoom, MaskSource, ObstacleSource};
pub use device::{
    default_output_device, find_output_device, list_output_devices, AudioDevice,
    AudioOutputStream,
};
pub use error::{AudioError, DecodeError};
pub use ring::RingBuffer;

#[cfg(feature = "symphonia")]
pub use decode::SymphoniaSource;
