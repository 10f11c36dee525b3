//! Error types for the audio bridge, device backend, and file-decode ingest.

use thiserror::Error;

/// Errors produced while decoding an audio file into a [`fathom_core::Sample`].
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file could not be opened or read.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// Path of the file that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The container or codec could not be probed/identified.
    #[error("could not probe audio format for '{path}': {reason}")]
    Probe {
        /// Path of the file that failed to probe.
        path: String,
        /// Description of the probe failure.
        reason: String,
    },

    /// The file has no decodable audio track.
    #[error("no audio track found in '{path}'")]
    NoAudioTrack {
        /// Path of the file with no usable track.
        path: String,
    },

    /// The track's sample rate could not be determined.
    #[error("'{path}' has no known sample rate")]
    MissingSampleRate {
        /// Path of the file with an unknown sample rate.
        path: String,
    },

    /// The underlying codec failed mid-stream.
    #[error("decode error in '{path}': {reason}")]
    Codec {
        /// Path of the file being decoded.
        path: String,
        /// Description of the codec failure.
        reason: String,
    },
}

/// Errors produced by the audio device backend.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No audio output device is available on this system.
    #[error("no audio output device available")]
    NoDevice,

    /// A device matching the requested name/index could not be found.
    #[error("audio device not found: {0}")]
    DeviceNotFound(String),

    /// Building the cpal stream failed.
    #[error("failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    /// Enumerating devices failed.
    #[error("failed to enumerate audio devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    /// Starting the cpal stream failed.
    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// Querying the device's supported configuration failed.
    #[error("failed to query device configuration: {0}")]
    DefaultStreamConfig(#[from] cpal::DefaultStreamConfigError),

    /// An audio file failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
