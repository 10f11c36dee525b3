//! Exercises the GPU backend end to end against a real adapter, when one
//! is present. CI runners without a GPU skip these rather than fail, since
//! `wgpu::Instance::request_adapter` legitimately returns nothing there.

use fathom_core::{ContinuousSource, DampingPreset, Field, Sample, SimParams, SourcePool};
use fathom_gpu::{GpuBackend, GpuFramePlan};
use std::sync::Arc;

fn backend_or_skip(width: u32, height: u32) -> Option<GpuBackend> {
    match GpuBackend::try_new(width, height) {
        Ok(backend) => Some(backend),
        Err(_) => {
            eprintln!("skipping: no GPU adapter available in this environment");
            None
        }
    }
}

#[test]
fn silent_field_stays_silent_on_device() {
    let Some(mut backend) = backend_or_skip(32, 32) else {
        return;
    };

    let mut field = Field::new(32, 32);
    let mut sources = SourcePool::new();
    let preset = DampingPreset::realistic();
    let params = SimParams::default();
    let plan = GpuFramePlan {
        n: 4,
        dt: 1e-5,
        listener: None,
        active_window: (0, 0, 32, 32),
    };

    let listener_samples = backend
        .run_frame(&mut field, &mut sources, &preset, &params, &plan)
        .expect("frame should encode and run");

    assert_eq!(listener_samples.len(), 4);
    assert!(field.pressure().iter().all(|&p| p == 0.0));
}

/// Testable property 4 / scenario S6: the CPU and GPU paths must agree
/// per-cell within 1e-3 Pa over at least 500 consecutive substeps, for
/// identical seeded state (field, obstacles, preset, substep count, dt).
/// This specifically catches divergence at reflective boundary corners,
/// where the CPU's two sequential sweeps (row pass, then column pass)
/// produce a non-physical `r^2` amplification a naive single-pass GPU
/// boundary resolution does not reproduce.
#[test]
fn cpu_gpu_parity_500_steps() {
    let width = 128;
    let height = 128;
    let Some(mut backend) = backend_or_skip(width, height) else {
        return;
    };

    let mut gpu_field = Field::new(width, height);
    gpu_field.add_impulse(width / 2, height / 2, 50.0, 4).unwrap();
    let mut cpu_field = gpu_field.clone();

    let params = SimParams::default();
    let preset = DampingPreset::realistic();
    let dt = params.max_stable_dt();
    let n = 500;

    let plan = GpuFramePlan {
        n,
        dt,
        listener: None,
        active_window: (0, 0, width, height),
    };
    let mut gpu_sources = SourcePool::new();
    backend
        .run_frame(&mut gpu_field, &mut gpu_sources, &preset, &params, &plan)
        .expect("frame should encode and run");

    for _ in 0..n {
        cpu_field.step(dt, &params, &preset, None);
    }

    let max_diff = gpu_field
        .pressure()
        .iter()
        .zip(cpu_field.pressure().iter())
        .fold(0.0f32, |acc, (&gpu, &cpu)| acc.max((gpu - cpu).abs()));

    assert!(
        max_diff < 1e-3,
        "CPU/GPU divergence {max_diff} Pa exceeds the 1e-3 Pa parity tolerance"
    );
}

/// Testable property 1: a boundary-placed obstacle must stay exactly zero
/// on the GPU path, just like the interior case — boundary resolution runs
/// in a separate pass from the interior stencil and must honor the
/// obstacle mask too.
#[test]
fn boundary_obstacle_stays_zero_on_device() {
    let width = 32;
    let height = 32;
    let Some(mut backend) = backend_or_skip(width, height) else {
        return;
    };

    let mut field = Field::new(width, height);
    field.add_obstacle(0, 16, 1).unwrap();
    field.add_impulse(5, 16, 50.0, 3).unwrap();
    let mut sources = SourcePool::new();
    let preset = DampingPreset::realistic();
    let params = SimParams::default();
    let plan = GpuFramePlan {
        n: 20,
        dt: params.max_stable_dt(),
        listener: None,
        active_window: (0, 0, width, height),
    };

    backend
        .run_frame(&mut field, &mut sources, &preset, &params, &plan)
        .expect("frame should encode and run");

    assert_eq!(field.pressure()[(16 * width) as usize], 0.0);
}

#[test]
fn continuous_source_injects_nonzero_pressure() {
    let Some(mut backend) = backend_or_skip(32, 32) else {
        return;
    };

    let mut field = Field::new(32, 32);
    let mut sources = SourcePool::new();
    let sample = Arc::new(Sample::new(vec![1.0; 100], 100, "tone"));
    sources.add_source(ContinuousSource::new(sample, 16, 16));

    let preset = DampingPreset::realistic();
    let params = SimParams::default();
    let plan = GpuFramePlan {
        n: 2,
        dt: 1e-5,
        listener: Some((16, 16)),
        active_window: (0, 0, 32, 32),
    };

    backend
        .run_frame(&mut field, &mut sources, &preset, &params, &plan)
        .expect("frame should encode and run");

    assert!(field.pressure().iter().any(|&p| p != 0.0));
}
