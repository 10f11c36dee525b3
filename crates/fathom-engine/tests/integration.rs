//! End-to-end scenario tests for the simulator facade.

use std::f32::consts::PI;
use std::sync::Arc;

use fathom_core::Sample;
use fathom_engine::{Backend, Simulator};

fn sine_sample(freq_hz: f32, sample_rate: u32, seconds: f32) -> Arc<Sample> {
    let n = (sample_rate as f32 * seconds) as usize;
    let samples: Vec<f32> = (0..n)
        .map(|i| (2.0 * PI * freq_hz * i as f32 / sample_rate as f32).sin())
        .collect();
    Arc::new(Sample::new(samples, sample_rate, "440hz_tone"))
}

/// Power at one candidate frequency via Goertzel's algorithm: a
/// single-bin DFT computed with a second-order IIR recursion, used here
/// instead of a full FFT since only a narrowband peak search is needed.
fn goertzel_power(samples: &[f32], sample_rate: f32, freq_hz: f32) -> f32 {
    let n = samples.len() as f32;
    let k = (0.5 + n * freq_hz / sample_rate).floor();
    let omega = 2.0 * PI * k / n;
    let coeff = 2.0 * omega.cos();
    let (mut s_prev, mut s_prev2) = (0.0f32, 0.0f32);
    for &x in samples {
        let s = x + coeff * s_prev - s_prev2;
        s_prev2 = s_prev;
        s_prev = s;
    }
    s_prev2 * s_prev2 + s_prev * s_prev - coeff * s_prev * s_prev2
}

/// The integer-Hz bin with the highest Goertzel power in `1..=max_hz`.
fn dominant_frequency_hz(samples: &[f32], sample_rate: f32, max_hz: u32) -> u32 {
    let mut best_hz = 1u32;
    let mut best_power = f32::MIN;
    for hz in 1..=max_hz {
        let power = goertzel_power(samples, sample_rate, hz as f32);
        if power > best_power {
            best_power = power;
            best_hz = hz;
        }
    }
    best_hz
}

#[test]
fn s1_empty_room_centered_impulse_decays_to_near_zero() {
    let mut sim = Simulator::new(400, 200);
    sim.add_impulse(200, 100, 5.0, 2).unwrap();

    // One second of simulated time at a 60 Hz frame cadence.
    for _ in 0..60 {
        sim.advance(1.0 / 60.0);
    }

    let peak = sim
        .field()
        .pressure()
        .iter()
        .fold(0.0f32, |acc, &p| acc.max(p.abs()));
    assert!(peak < 0.1, "expected near-zero field, got peak {peak}");
}

#[test]
fn s2_obstacle_occlusion_delays_arrival_past_the_direct_path() {
    let width = 400u32;
    let height = 200u32;
    let mut sim = Simulator::new(width, height);

    // Vertical wall at x=200 for y in [0, 160), leaving a door at
    // y in [160, 200).
    let mut mask = vec![0u8; (width * height) as usize];
    for y in 0..160u32 {
        mask[(y * width + 200) as usize] = 1;
    }
    sim.load_obstacles(&mask).unwrap();

    sim.add_impulse(100, 100, 10.0, 3).unwrap();
    sim.set_listener_position(300, 100);
    sim.set_listener_enabled(true);

    let dt = sim.params().max_stable_dt();
    let direct_path_time = 200.0 * sim.params().dx / sim.params().c;

    let mut samples = Vec::new();
    for _ in 0..6 {
        sim.advance(1.0 / 60.0);
        samples.extend(sim.take_listener_frame());
    }

    let peak = samples.iter().fold(0.0f32, |acc, &p| acc.max(p.abs()));
    let threshold = peak * 0.01;
    let arrival_index = samples
        .iter()
        .position(|&p| p.abs() > threshold)
        .expect("the wavefront should reach the listener within the simulated window");
    let arrival_time = arrival_index as f32 * dt;

    assert!(
        arrival_time > direct_path_time,
        "arrival at {arrival_time}s should be later than the unobstructed \
         direct-path time {direct_path_time}s (diffraction around the door)"
    );
}

#[test]
fn s4_continuous_tone_dominant_frequency_is_440hz() {
    let mut sim = Simulator::new(400, 200);
    let tone = sine_sample(440.0, 44_100, 0.25);
    sim.add_source(tone, 100, 100);
    sim.set_listener_position(300, 100);
    sim.set_listener_enabled(true);

    let dt = sim.params().max_stable_dt();
    let sample_rate = 1.0 / dt;

    let mut samples = Vec::new();
    let mut simulated = 0.0f32;
    while simulated < 0.5 {
        sim.advance(1.0 / 60.0);
        samples.extend(sim.take_listener_frame());
        simulated += 1.0 / 60.0;
    }

    let dominant = dominant_frequency_hz(&samples, sample_rate, 1000);
    assert!(
        (dominant as f32 - 440.0).abs() <= 1.0,
        "dominant frequency {dominant} Hz should be within 1 Hz of 440 Hz"
    );
}

#[test]
fn s5_active_region_growth_is_bounded() {
    let mut sim = Simulator::new(1000, 1000);
    sim.add_impulse(500, 500, 5.0, 2).unwrap();

    let dt_max = sim.params().max_stable_dt();
    let steps_per_frame = (1.0 / 60.0 / dt_max).ceil();

    for frame in 1..=200u32 {
        sim.advance(1.0 / 60.0);
        let (min_x, min_y, max_x, max_y) = sim.field().active_region().bounds().unwrap();
        let side = (max_x - min_x).max(max_y - min_y) as f32;

        let bound = 2.0
            * (2.0 * sim.params().c * dt_max * steps_per_frame * frame as f32)
            / sim.params().dx
            + 2.0
            + 2.0;
        assert!(
            side <= bound,
            "frame {frame}: active region side {side} exceeds bound {bound}"
        );
    }
}

#[test]
fn s7_damping_preset_application_matches_named_constants() {
    let mut sim = Simulator::new(32, 32);
    sim.apply_preset_by_name("realistic").unwrap();
    assert!((sim.preset().d - 0.997).abs() < 1e-6);
    assert!((sim.preset().r - 0.85).abs() < 1e-6);

    sim.apply_preset_by_name("anechoic").unwrap();
    assert_eq!(sim.preset().r, 0.0);
    assert!(sim.preset().is_absorbing());
}

#[test]
fn overload_truncates_substeps_to_the_cap() {
    let mut sim = Simulator::new(16, 16);
    // A huge frame duration forces far more substeps than the cap allows.
    let stats = sim.advance(10.0);
    assert_eq!(stats.plan.n, fathom_engine::MAX_SUBSTEPS);
    assert!(stats.plan.overloaded);
}

#[test]
fn listener_cardinality_matches_substep_count_when_enabled() {
    let mut sim = Simulator::new(32, 32);
    sim.set_listener_enabled(true);
    let stats = sim.advance(1.0 / 60.0);
    let frame = sim.take_listener_frame();
    assert_eq!(frame.len(), stats.plan.n as usize);
}

#[test]
fn listener_cardinality_is_zero_when_disabled() {
    let mut sim = Simulator::new(32, 32);
    sim.set_listener_enabled(false);
    sim.advance(1.0 / 60.0);
    let frame = sim.take_listener_frame();
    assert_eq!(frame.len(), 0);
}

#[test]
#[cfg(not(feature = "gpu"))]
fn requesting_gpu_backend_reports_cpu_without_the_gpu_feature() {
    let mut sim = Simulator::new(32, 32);
    sim.set_backend(Backend::Gpu);
    let stats = sim.advance(1.0 / 60.0);
    assert_eq!(stats.backend, Backend::Cpu);
}

#[test]
#[cfg(feature = "gpu")]
fn requesting_gpu_backend_falls_back_to_cpu_without_an_adapter() {
    // CI runners commonly have no GPU; a missing adapter must fall back
    // to the CPU path for the frame rather than panicking or stalling.
    let mut sim = Simulator::new(32, 32);
    sim.set_backend(Backend::Gpu);
    let stats = sim.advance(1.0 / 60.0);
    assert!(matches!(stats.backend, Backend::Cpu | Backend::Gpu));
}
