//! Criterion benchmarks for the FDTD leapfrog stepper.
//!
//! Run with: cargo bench -p fathom-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fathom_core::{step_cpu, DampingPreset, SimParams};

const GRID_SIDES: &[u32] = &[64, 128, 256, 512];

fn flat_buffers(width: u32, height: u32) -> (Vec<f32>, Vec<f32>, Vec<f32>, Vec<u8>) {
    let len = (width as usize) * (height as usize);
    let mut cur = vec![0.0f32; len];
    // a centered impulse gives the stencil nonzero neighbors to sum, closer
    // to a real frame than an all-silent grid.
    cur[len / 2] = 10.0;
    (vec![0.0; len], cur, vec![0.0; len], vec![0u8; len])
}

fn bench_step_interior(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_cpu/reflective");
    let params = SimParams::default();
    let preset = DampingPreset::realistic();

    for &side in GRID_SIDES {
        let (prev, cur, mut next, obstacle) = flat_buffers(side, side);
        group.bench_with_input(BenchmarkId::from_parameter(side * side), &side, |b, _| {
            b.iter(|| {
                black_box(step_cpu(
                    black_box(&prev),
                    black_box(&cur),
                    black_box(&mut next),
                    black_box(&obstacle),
                    side,
                    side,
                    1e-5,
                    &params,
                    &preset,
                    None,
                ));
            });
        });
    }

    group.finish();
}

fn bench_step_absorbing(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_cpu/absorbing");
    let params = SimParams::default();
    let preset = DampingPreset::anechoic();

    for &side in GRID_SIDES {
        let (prev, cur, mut next, obstacle) = flat_buffers(side, side);
        group.bench_with_input(BenchmarkId::from_parameter(side * side), &side, |b, _| {
            b.iter(|| {
                black_box(step_cpu(
                    black_box(&prev),
                    black_box(&cur),
                    black_box(&mut next),
                    black_box(&obstacle),
                    side,
                    side,
                    1e-5,
                    &params,
                    &preset,
                    None,
                ));
            });
        });
    }

    group.finish();
}

fn bench_step_with_listener(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_cpu/with_listener");
    let params = SimParams::default();
    let preset = DampingPreset::realistic();
    let side = 256u32;
    let (prev, cur, mut next, obstacle) = flat_buffers(side, side);

    group.bench_function("256x256", |b| {
        b.iter(|| {
            black_box(step_cpu(
                black_box(&prev),
                black_box(&cur),
                black_box(&mut next),
                black_box(&obstacle),
                side,
                side,
                1e-5,
                &params,
                &preset,
                Some((side / 4, side / 4)),
            ));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_step_interior,
    bench_step_absorbing,
    bench_step_with_listener,
);
criterion_main!(benches);
