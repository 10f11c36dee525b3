//! Error types for preset and room layout persistence.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by TOML-backed persistence operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file.
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a directory.
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML.
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A damping preset name matched none of the known kinds.
    #[error("unknown damping preset: {0}")]
    UnknownPreset(String),

    /// A room layout's persisted mask length did not match its persisted
    /// dimensions.
    #[error("room layout '{name}' has a {actual}-byte mask but declares {expected} cells")]
    DimensionMismatch {
        /// Name of the offending layout.
        name: String,
        /// Expected mask length (`width * height`).
        expected: usize,
        /// Actual persisted mask length.
        actual: usize,
    },
}

impl ConfigError {
    /// Builds a [`ConfigError::ReadFile`].
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile { path: path.into(), source }
    }

    /// Builds a [`ConfigError::WriteFile`].
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFile { path: path.into(), source }
    }

    /// Builds a [`ConfigError::CreateDir`].
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CreateDir { path: path.into(), source }
    }
}
