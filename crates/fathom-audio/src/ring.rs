//! A fixed-capacity ring buffer decoupling the simulator's burst-rate
//! listener output from the audio device's steady-rate consumption.
//!
//! The workspace denies `unsafe_code`, so this is not the raw-pointer SPSC
//! ring the spec's design notes gesture at; it is the explicitly-sanctioned
//! equivalent — a `Vec<f32>` protected by one short-held [`Mutex`], with
//! `gain`/`mute` split out as atomics so the audio callback can read them
//! without taking the lock at all. The producer (simulator) locks once per
//! frame to push a batch; the consumer (audio callback) uses
//! [`Mutex::try_lock`] so it can never block on a producer that is mid-push
//! — an empty read just means silence this callback.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

struct RingInner {
    buf: Vec<f32>,
    /// Monotonically increasing; only ever wraps via `% buf.len()` at
    /// access time, never stored wrapped, so the distance `write - read`
    /// always reflects the true backlog.
    write: u64,
    read: u64,
}

impl RingInner {
    fn len_backlog(&self) -> u64 {
        self.write.saturating_sub(self.read)
    }
}

/// A power-of-two-capacity float ring buffer with atomic gain and mute.
pub struct RingBuffer {
    inner: Mutex<RingInner>,
    capacity: usize,
    gain: AtomicU32,
    mute: AtomicBool,
}

impl RingBuffer {
    /// Creates a ring buffer with room for one second of audio at
    /// `sample_rate`, rounded up to the next power of two.
    pub fn for_sample_rate(sample_rate: u32) -> Self {
        let capacity = sample_rate.max(1).next_power_of_two() as usize;
        Self::with_capacity(capacity)
    }

    /// Creates a ring buffer with the given power-of-two capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or not a power of two.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0 && capacity.is_power_of_two(), "ring buffer capacity must be a nonzero power of two");
        Self {
            inner: Mutex::new(RingInner {
                buf: vec![0.0; capacity],
                write: 0,
                read: 0,
            }),
            capacity,
            gain: AtomicU32::new(1.0f32.to_bits()),
            mute: AtomicBool::new(false),
        }
    }

    /// Buffer capacity, in samples.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current linear gain multiplier.
    #[inline]
    pub fn gain(&self) -> f32 {
        f32::from_bits(self.gain.load(Ordering::Relaxed))
    }

    /// Sets the linear gain multiplier applied in the audio callback.
    pub fn set_gain(&self, gain: f32) {
        self.gain.store(gain.to_bits(), Ordering::Relaxed);
    }

    /// Whether output is currently muted.
    #[inline]
    pub fn is_muted(&self) -> bool {
        self.mute.load(Ordering::Relaxed)
    }

    /// Sets the mute flag.
    pub fn set_muted(&self, muted: bool) {
        self.mute.store(muted, Ordering::Relaxed);
    }

    /// Pushes a batch of samples (producer side). If the batch would
    /// overrun the reader, the reader is advanced by the overrun amount
    /// first — the oldest unread samples are silently dropped rather than
    /// blocking the simulator.
    pub fn push_slice(&self, values: &[f32]) {
        if values.is_empty() {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());
        let capacity = self.capacity as u64;

        for &value in values {
            if inner.len_backlog() >= capacity {
                let dropped = inner.len_backlog() - capacity + 1;
                inner.read += dropped;
                tracing::debug!(dropped, "audio ring overflow, dropping oldest samples");
            }
            let idx = (inner.write % capacity) as usize;
            inner.buf[idx] = value;
            inner.write += 1;
        }
    }

    /// Pops up to `out.len()` samples into `out` (consumer side, pressure
    /// values in pascals — not yet gain/mute mapped). Returns the number of
    /// samples actually available; any remainder of `out` is left
    /// untouched by this call (callers should `fill(0.0)` first).
    ///
    /// Never blocks: if the producer currently holds the lock, this
    /// returns `0` immediately rather than waiting.
    pub fn try_pop_into(&self, out: &mut [f32]) -> usize {
        let Ok(mut inner) = self.inner.try_lock() else {
            return 0;
        };
        let available = inner.len_backlog().min(out.len() as u64) as usize;
        let capacity = self.capacity as u64;
        for slot in out.iter_mut().take(available) {
            let idx = (inner.read % capacity) as usize;
            *slot = inner.buf[idx];
            inner.read += 1;
        }
        available
    }

    /// Number of samples currently queued and unread.
    pub fn backlog(&self) -> usize {
        self.inner.lock().unwrap_or_else(|poison| poison.into_inner()).len_backlog() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_pop_round_trips_in_order() {
        let ring = RingBuffer::with_capacity(8);
        ring.push_slice(&[1.0, 2.0, 3.0]);
        let mut out = [0.0; 4];
        let n = ring.try_pop_into(&mut out);
        assert_eq!(n, 3);
        assert_eq!(out, [1.0, 2.0, 3.0, 0.0]);
    }

    #[test]
    fn overflow_drops_oldest_samples_and_never_panics() {
        let ring = RingBuffer::with_capacity(4);
        ring.push_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(ring.backlog(), 4);
        let mut out = [0.0; 4];
        ring.try_pop_into(&mut out);
        assert_eq!(out, [3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn empty_ring_pops_zero_samples() {
        let ring = RingBuffer::with_capacity(4);
        let mut out = [0.0; 4];
        assert_eq!(ring.try_pop_into(&mut out), 0);
    }

    #[test]
    fn gain_and_mute_round_trip() {
        let ring = RingBuffer::with_capacity(4);
        ring.set_gain(0.5);
        ring.set_muted(true);
        assert!((ring.gain() - 0.5).abs() < 1e-6);
        assert!(ring.is_muted());
    }

    #[test]
    fn for_sample_rate_rounds_up_to_power_of_two() {
        let ring = RingBuffer::for_sample_rate(48_000);
        assert_eq!(ring.capacity(), 65_536);
    }
}
