//! The audio bridge: resamples the per-frame listener vector onto the
//! device's audio-rate callback via a lock-free(-equivalent) ring buffer.

use std::sync::Arc;

use crate::ring::RingBuffer;

/// Reference pressure, in pascals, corresponding to 134 dB SPL — the
/// ceiling the audio callback maps pressure amplitude against.
const REFERENCE_PRESSURE_PA: f32 = 20.0;

/// Amplitude ceiling the audio callback clamps to, just shy of full scale
/// to leave headroom against clipping.
const AMPLITUDE_CEILING: f32 = 0.95;

/// Producer-side state for resampling the simulation's sub-step-rate
/// listener stream onto the audio device's fixed sample rate.
///
/// Owns the [`RingBuffer`] the audio callback reads from; cloning the
/// `Arc` returned by [`AudioBridge::ring`] is how the callback gets its own
/// handle without sharing `&mut self`.
pub struct AudioBridge {
    ring: Arc<RingBuffer>,
    sample_rate: u32,
    /// Simulated time, in seconds, at which the next audio-rate sample is
    /// due. Carried across frames so the interpolation grid doesn't reset
    /// at every frame boundary.
    next_output_time: f64,
    /// The last listener sample value and its simulated timestamp, carried
    /// from the end of the previous frame so interpolation has a left
    /// endpoint for the first output sample of the next frame.
    carry_value: f32,
    carry_time: f64,
    primed: bool,
}

impl AudioBridge {
    /// Creates a bridge with a one-second ring buffer at `sample_rate`.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            ring: Arc::new(RingBuffer::for_sample_rate(sample_rate)),
            sample_rate,
            next_output_time: 0.0,
            carry_value: 0.0,
            carry_time: 0.0,
            primed: false,
        }
    }

    /// The device sample rate this bridge was built for.
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// A cloneable handle to the underlying ring buffer, for handing to the
    /// audio callback closure.
    pub fn ring(&self) -> Arc<RingBuffer> {
        Arc::clone(&self.ring)
    }

    /// Sets the linear output gain.
    pub fn set_gain(&self, gain: f32) {
        self.ring.set_gain(gain);
    }

    /// Mutes or unmutes output.
    pub fn set_muted(&self, muted: bool) {
        self.ring.set_muted(muted);
    }

    /// Submits one frame's listener samples (one per sub-step, `dt` seconds
    /// apart) for resampling onto the audio device's rate.
    ///
    /// `time_scale` is simulated seconds per real second (`1.0` = real
    /// time, `>1.0` = fast-forward, `<1.0` = slow motion): the audio device
    /// advances at a fixed real-time rate, so each audio-rate step spans
    /// `time_scale / sample_rate` seconds of simulated time. Output samples
    /// falling within this frame's span are produced by linear
    /// interpolation between the two nearest listener samples (or the
    /// carried-over last sample of the previous frame, for the first few).
    /// Never blocks and never fails: this is the producer side of a ring
    /// buffer that drops the oldest samples under overflow instead.
    pub fn submit_listener_samples(&mut self, samples: &[f32], dt: f32, time_scale: f32) {
        if samples.is_empty() || dt <= 0.0 {
            return;
        }
        let dt = f64::from(dt);
        let scale = f64::from(time_scale.max(1e-9));
        let audio_step = scale / f64::from(self.sample_rate.max(1));

        let frame_start = self.carry_time;
        if !self.primed {
            self.next_output_time = frame_start;
            self.primed = true;
        }

        let sample_at = |relative_index: f64| -> f32 {
            // relative_index in [-1, samples.len() - 1]; -1 is the carried
            // value from the previous frame.
            if relative_index <= -1.0 {
                return self.carry_value;
            }
            let last = (samples.len() - 1) as f64;
            if relative_index >= last {
                return samples[samples.len() - 1];
            }
            let lo = relative_index.floor();
            let frac = (relative_index - lo) as f32;
            let lo_idx = lo as isize;
            let lo_val = if lo_idx < 0 { self.carry_value } else { samples[lo_idx as usize] };
            let hi_idx = (lo_idx + 1).max(0) as usize;
            let hi_val = samples[hi_idx.min(samples.len() - 1)];
            lo_val + (hi_val - lo_val) * frac
        };

        let frame_end = frame_start + samples.len() as f64 * dt;
        let mut produced = Vec::new();
        while self.next_output_time < frame_end {
            let elapsed = self.next_output_time - frame_start;
            let relative_index = elapsed / dt - 1.0;
            produced.push(sample_at(relative_index));
            self.next_output_time += audio_step;
        }

        if !produced.is_empty() {
            self.ring.push_slice(&produced);
        }

        self.carry_value = samples[samples.len() - 1];
        self.carry_time = frame_end;
    }

    /// Builds the audio-device-format callback: pulls resampled pressure
    /// values from the ring, maps them to normalized output amplitude, and
    /// applies gain and mute. Reads gain/mute once per callback invocation.
    /// Never allocates and never blocks — an empty ring just emits silence.
    pub fn build_callback(&self) -> impl FnMut(&mut [f32]) + Send + 'static {
        let ring = self.ring();
        move |output: &mut [f32]| {
            output.fill(0.0);
            let available = ring.try_pop_into(output);
            let gain = ring.gain();
            let muted = ring.is_muted();
            for sample in &mut output[..available] {
                let mapped = (*sample / REFERENCE_PRESSURE_PA * gain)
                    .clamp(-AMPLITUDE_CEILING, AMPLITUDE_CEILING);
                *sample = if muted { 0.0 } else { mapped };
            }
        }
    }
}
