//! Decoded audio sample storage, independent of any decoder.

#[cfg(not(feature = "std"))]
use alloc::string::String;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Mono PCM audio, decoded to `f32` samples in `[-1, 1]`, tagged with its
/// native sample rate and a human-readable name.
///
/// Decoding (WAV, MP3, ...) is a `std`-only concern handled entirely outside
/// this crate; `Sample` only stores the result so that continuous sources
/// can share a single decoded buffer via [`alloc::sync::Arc`].
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    samples: Vec<f32>,
    sample_rate: u32,
    name: String,
}

impl Sample {
    /// Wraps an already-decoded mono `f32` buffer.
    pub fn new(samples: Vec<f32>, sample_rate: u32, name: impl Into<String>) -> Self {
        Self {
            samples,
            sample_rate,
            name: name.into(),
        }
    }

    /// The decoded samples, in `[-1, 1]`.
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// The native sample rate the samples were decoded at.
    #[inline]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// A human-readable label, typically the source file name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the sample buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds, or `0.0` if the sample rate is `0`.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.samples.len() as f32 / self.sample_rate as f32
        }
    }
}
