//! Subcommand implementations.

pub mod bench;
pub mod devices;
pub mod presets;
pub mod run;
