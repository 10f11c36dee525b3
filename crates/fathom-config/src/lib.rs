//! TOML persistence for damping presets and room layouts.
//!
//! This is new relative to the in-memory-only treatment of presets in
//! `fathom-core`: presets and layouts here are named, filesystem-backed
//! objects the CLI (or any other frontend) can list, load, and save without
//! the solver core knowing filesystem paths exist.

mod error;
mod layout;
mod preset_file;

/// Platform-specific paths for presets, layouts, and configuration.
pub mod paths;

pub use error::ConfigError;
pub use layout::{load_layout, save_layout, GridPoint, RoomLayout};
pub use preset_file::{load_named_preset, save_named_preset, PresetFile};
