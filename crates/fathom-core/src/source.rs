//! Continuously-playing point sources and the pool that owns them.

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::sync::Arc;

use crate::sample::Sample;

/// Reference pressure, in pascals, a unity-gain (0 dB) source injects at
/// full-scale sample amplitude.
const REFERENCE_PRESSURE_PA: f32 = 20.0;

/// A handle identifying a source within a [`SourcePool`].
///
/// Stable across additions and removals of other sources: indices of
/// removed sources are tombstoned, not reused or shifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceHandle(usize);

/// A point source that continuously injects samples from a decoded
/// [`Sample`] into the field.
#[derive(Debug, Clone)]
pub struct ContinuousSource {
    sample: Arc<Sample>,
    position: f64,
    gain_db: f32,
    looping: bool,
    playing: bool,
    x: u32,
    y: u32,
}

impl ContinuousSource {
    /// Creates a new source at the given grid coordinates, playing from the
    /// start of `sample`.
    pub fn new(sample: Arc<Sample>, x: u32, y: u32) -> Self {
        Self {
            sample,
            position: 0.0,
            gain_db: 0.0,
            looping: true,
            playing: true,
            x,
            y,
        }
    }

    /// Grid coordinates of this source.
    #[inline]
    pub const fn position_xy(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    /// Moves the source to new grid coordinates.
    pub fn set_position_xy(&mut self, x: u32, y: u32) {
        self.x = x;
        self.y = y;
    }

    /// Sets the gain applied to this source, in decibels.
    pub fn set_gain_db(&mut self, gain_db: f32) {
        self.gain_db = gain_db;
    }

    /// Whether the source loops back to the start when it reaches the end
    /// of its sample.
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Starts or resumes playback.
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Pauses playback without resetting the read position.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Whether this source is currently advancing.
    #[inline]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Advances the read cursor by one simulation substep of length `dt`
    /// and returns the pressure, in pascals, to inject this substep.
    ///
    /// The sample is read at its native rate independent of the
    /// simulation's substep rate: each call averages `max(1, round(rate *
    /// dt))` consecutive sample-rate samples starting at the fractional
    /// cursor, then advances the cursor by that count. A non-looping
    /// source that runs past the end of its buffer stops advancing and
    /// returns `0.0`.
    pub fn sample_for_step(&mut self, dt: f32) -> f32 {
        if !self.playing {
            return 0.0;
        }

        let samples = self.sample.samples();
        if samples.is_empty() {
            return 0.0;
        }

        let rate = self.sample.sample_rate() as f64;
        let count = (rate * f64::from(dt)).round().max(1.0) as usize;

        let mut acc = 0.0f32;
        let mut taken = 0usize;
        let start = self.position as usize;
        for i in 0..count {
            let idx = start + i;
            let idx = if self.looping {
                idx % samples.len()
            } else if idx < samples.len() {
                idx
            } else {
                break;
            };
            acc += samples[idx];
            taken += 1;
        }

        if taken == 0 {
            self.playing = false;
            return 0.0;
        }

        self.position += count as f64;
        if self.looping {
            self.position %= samples.len() as f64;
        } else if self.position as usize >= samples.len() {
            self.playing = false;
        }

        let avg = acc / taken as f32;
        let linear_gain = libm::powf(10.0, self.gain_db / 20.0);
        avg * linear_gain * REFERENCE_PRESSURE_PA
    }
}

/// Owns a dynamic collection of [`ContinuousSource`]s, addressed by stable
/// [`SourceHandle`]s.
///
/// Removed slots are tombstoned with `None` rather than shifting later
/// handles, so a handle obtained from [`SourcePool::add_source`] remains
/// valid (or cleanly reports "gone") for the pool's lifetime.
#[derive(Debug, Clone, Default)]
pub struct SourcePool {
    slots: Vec<Option<ContinuousSource>>,
}

impl SourcePool {
    /// An empty pool.
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Adds a source and returns a handle to it.
    pub fn add_source(&mut self, source: ContinuousSource) -> SourceHandle {
        self.slots.push(Some(source));
        SourceHandle(self.slots.len() - 1)
    }

    /// Removes a source, freeing its slot. Returns the removed source, or
    /// `None` if the handle was already removed or never valid.
    pub fn remove_source(&mut self, handle: SourceHandle) -> Option<ContinuousSource> {
        self.slots.get_mut(handle.0).and_then(Option::take)
    }

    /// Removes every source from the pool.
    pub fn clear_sources(&mut self) {
        self.slots.clear();
    }

    /// Mutable access to a source by handle.
    pub fn get_mut(&mut self, handle: SourceHandle) -> Option<&mut ContinuousSource> {
        self.slots.get_mut(handle.0).and_then(Option::as_mut)
    }

    /// Read access to a source by handle.
    pub fn get(&self, handle: SourceHandle) -> Option<&ContinuousSource> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    /// Iterates over all live sources and their handles.
    pub fn iter(&self) -> impl Iterator<Item = (SourceHandle, &ContinuousSource)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (SourceHandle(i), s)))
    }

    /// Mutably iterates over all live sources and their handles.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SourceHandle, &mut ContinuousSource)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, s)| s.as_mut().map(|s| (SourceHandle(i), s)))
    }

    /// Number of live (non-tombstoned) sources.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether the pool has no live sources.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone_sample() -> Arc<Sample> {
        Arc::new(Sample::new(vec![1.0; 1000], 1000, "tone"))
    }

    #[test]
    fn handle_stays_valid_after_unrelated_removal() {
        let mut pool = SourcePool::new();
        let a = pool.add_source(ContinuousSource::new(tone_sample(), 0, 0));
        let b = pool.add_source(ContinuousSource::new(tone_sample(), 1, 1));
        pool.remove_source(a);
        assert!(pool.get(b).is_some());
        assert!(pool.get(a).is_none());
    }

    #[test]
    fn non_looping_source_stops_at_end() {
        let mut source = ContinuousSource::new(tone_sample(), 0, 0);
        source.set_looping(false);
        for _ in 0..2000 {
            source.sample_for_step(0.001);
        }
        assert!(!source.is_playing());
    }

    #[test]
    fn looping_source_wraps_forever() {
        let mut source = ContinuousSource::new(tone_sample(), 0, 0);
        for _ in 0..5000 {
            source.sample_for_step(0.001);
        }
        assert!(source.is_playing());
    }

    #[test]
    fn paused_source_yields_zero() {
        let mut source = ContinuousSource::new(tone_sample(), 0, 0);
        source.pause();
        assert_eq!(source.sample_for_step(0.001), 0.0);
    }
}
