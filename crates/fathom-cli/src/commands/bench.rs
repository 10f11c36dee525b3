//! Headless throughput measurement: runs N frames with no audio output and
//! reports substeps-per-second, for comparing the CPU and GPU backends.

use std::time::Instant;

use clap::Args;

use fathom_core::DampingPreset;
use fathom_engine::{Backend, Simulator};

#[derive(Args)]
pub struct BenchArgs {
    /// Grid width, in cells
    #[arg(long, default_value_t = 512)]
    width: u32,

    /// Grid height, in cells
    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Number of frames to run
    #[arg(long, default_value_t = 200)]
    frames: u32,

    /// Simulated seconds per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    frame_duration: f32,

    /// Also benchmark the GPU backend (requires the `gpu` feature)
    #[arg(long)]
    gpu: bool,
}

fn bench_backend(width: u32, height: u32, frames: u32, frame_duration: f32, backend: Backend) -> anyhow::Result<f64> {
    let mut sim = Simulator::new(width, height);
    sim.apply_preset(DampingPreset::realistic());
    sim.add_impulse(width / 2, height / 2, 10.0, 4)?;
    sim.set_backend(backend);

    // Warm up: acquire the GPU backend and let the active region grow
    // before timing starts.
    sim.advance(frame_duration);

    let mut total_substeps: u64 = 0;
    let started = Instant::now();
    for _ in 0..frames {
        let stats = sim.advance(frame_duration);
        total_substeps += u64::from(stats.plan.n);
    }
    let elapsed = started.elapsed().as_secs_f64();

    Ok(total_substeps as f64 / elapsed.max(1e-9))
}

pub fn run(args: BenchArgs) -> anyhow::Result<()> {
    println!(
        "Benchmarking {}x{} grid, {} frames at {:.4}s/frame",
        args.width, args.height, args.frames, args.frame_duration
    );

    let cpu_rate = bench_backend(args.width, args.height, args.frames, args.frame_duration, Backend::Cpu)?;
    println!("CPU:  {cpu_rate:.0} substeps/sec");

    if args.gpu {
        let gpu_rate = bench_backend(args.width, args.height, args.frames, args.frame_duration, Backend::Gpu)?;
        println!("GPU:  {gpu_rate:.0} substeps/sec");
        println!("Speedup: {:.2}x", gpu_rate / cpu_rate.max(1e-9));
    }

    Ok(())
}
