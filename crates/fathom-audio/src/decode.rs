//! External-collaborator seams from spec.md §6: the obstacle rasterizer and
//! the audio-file decoder. The solver core never parses an image or an
//! audio container — it only ever sees this module's output types.

use std::path::Path;
use std::sync::Arc;

use fathom_core::Sample;

use crate::error::DecodeError;

/// The SVG rasterizer collaborator: turns a room layout into a boolean
/// obstacle grid. `fathom-engine` only ever consumes the resulting
/// `Vec<u8>` via `Field::load_obstacles_from_mask`, never this trait
/// directly — it stays decoupled from how the mask was produced.
pub trait ObstacleSource {
    /// Rasterizes this source into a `width * height` mask; non-zero marks
    /// an obstacle cell.
    fn rasterize(&self, width: u32, height: u32) -> Vec<u8>;
}

/// The audio-file decoder collaborator: turns a file on disk into mono PCM.
pub trait AudioFileSource {
    /// Decodes `path` into a mono [`Sample`].
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the file cannot be read, probed, or
    /// decoded.
    fn decode(&self, path: &Path) -> Result<Arc<Sample>, DecodeError>;
}

/// An [`ObstacleSource`] that always rasterizes to an empty (obstacle-free)
/// grid — the trivial case for tests and headless runs with no room
/// layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRoom;

impl ObstacleSource for EmptyRoom {
    fn rasterize(&self, width: u32, height: u32) -> Vec<u8> {
        vec![0u8; (width as usize) * (height as usize)]
    }
}

/// An [`ObstacleSource`] backed by an already-rasterized mask, e.g. one
/// persisted via `fathom-config`'s room layouts.
#[derive(Debug, Clone)]
pub struct MaskSource {
    mask: Vec<u8>,
    width: u32,
    height: u32,
}

impl MaskSource {
    /// Wraps a pre-rasterized `width * height` mask.
    pub const fn new(mask: Vec<u8>, width: u32, height: u32) -> Self {
        Self { mask, width, height }
    }
}

impl ObstacleSource for MaskSource {
    fn rasterize(&self, width: u32, height: u32) -> Vec<u8> {
        if width == self.width && height == self.height {
            self.mask.clone()
        } else {
            tracing::warn!(
                expected_w = self.width,
                expected_h = self.height,
                requested_w = width,
                requested_h = height,
                "mask source dimension mismatch, rasterizing an empty grid instead"
            );
            vec![0u8; (width as usize) * (height as usize)]
        }
    }
}

/// An [`AudioFileSource`] backed by [`symphonia`], the retrieval corpus's
/// own format-agnostic decoder, feature-gated so the core workspace never
/// forces that dependency on callers who only drive the solver
/// programmatically.
#[cfg(feature = "symphonia")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaSource;

#[cfg(feature = "symphonia")]
impl AudioFileSource for SymphoniaSource {
    fn decode(&self, path: &Path) -> Result<Arc<Sample>, DecodeError> {
        symphonia_decode::decode_file(path).map(Arc::new)
    }
}

#[cfg(feature = "symphonia")]
mod symphonia_decode {
    use std::fs::File;
    use std::path::Path;

    use symphonia::core::audio::{AudioBufferRef, SampleBuffer};
    use symphonia::core::codecs::DecoderOptions;
    use symphonia::core::errors::Error as SymphoniaError;
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;
    use symphonia::default::{get_codecs, get_probe};

    use fathom_core::Sample;

    use super::DecodeError;

    pub(super) fn decode_file(path: &Path) -> Result<Sample, DecodeError> {
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let path_str = path.to_string_lossy().into_owned();

        let file = File::open(path).map_err(|source| DecodeError::Io { path: path_str.clone(), source })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|err| DecodeError::Probe { path: path_str.clone(), reason: err.to_string() })?;

        let mut format = probed.format;
        let track = format
            .default_track()
            .ok_or_else(|| DecodeError::NoAudioTrack { path: path_str.clone() })?;
        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| DecodeError::MissingSampleRate { path: path_str.clone() })?;

        let mut decoder = get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|err| DecodeError::Codec { path: path_str.clone(), reason: err.to_string() })?;

        let mut samples = Vec::new();
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(err) => {
                    return Err(DecodeError::Codec { path: path_str.clone(), reason: err.to_string() });
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => samples.extend(to_normalized_mono(decoded)),
                Err(SymphoniaError::DecodeError(_)) => continue,
                Err(SymphoniaError::IoError(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(err) => {
                    return Err(DecodeError::Codec { path: path_str.clone(), reason: err.to_string() });
                }
            }
        }

        Ok(Sample::new(samples, sample_rate, display_name))
    }

    fn to_normalized_mono(decoded: AudioBufferRef<'_>) -> Vec<f32> {
        let spec = *decoded.spec();
        let channels = spec.channels.count();
        if channels == 0 {
            return Vec::new();
        }

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);

        buffer
            .samples()
            .chunks_exact(channels)
            .map(|frame| (frame.iter().sum::<f32>() / channels as f32).clamp(-1.0, 1.0))
            .collect()
    }
}
