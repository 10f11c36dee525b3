//! Headless simulation driver: loads a room, opens an audio output stream,
//! and advances the scheduler at a fixed tick rate while accepting scripted
//! commands from stdin.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;

use fathom_audio::{AudioBridge, AudioOutputStream};
use fathom_config::RoomLayout;
use fathom_engine::Simulator;

#[derive(Args)]
pub struct RunArgs {
    /// Room layout name or path; a silent room of `--width` x `--height` is
    /// used if omitted
    #[arg(short, long)]
    layout: Option<String>,

    /// Grid width, in cells, when no layout is given
    #[arg(long, default_value_t = 256)]
    width: u32,

    /// Grid height, in cells, when no layout is given
    #[arg(long, default_value_t = 128)]
    height: u32,

    /// Damping preset name (built-in or user-saved)
    #[arg(short, long, default_value = "realistic")]
    preset: String,

    /// Output device (index, exact name, or partial name)
    #[arg(short, long)]
    output: Option<String>,

    /// Audio device sample rate
    #[arg(long, default_value_t = 48_000)]
    sample_rate: u32,

    /// Scheduler frame rate, in hertz
    #[arg(long, default_value_t = 60.0)]
    frame_rate: f32,

    /// Linear output gain
    #[arg(long, default_value_t = 1.0)]
    gain: f32,

    /// Simulated seconds per real second the audio bridge resamples
    /// against (1.0 = real time, >1.0 = fast-forward, <1.0 = slow motion)
    #[arg(long, default_value_t = 1.0)]
    time_scale: f32,

    /// Stop after this many seconds of simulated time; runs until Ctrl+C or
    /// stdin EOF if omitted
    #[arg(long)]
    duration: Option<f32>,

    /// A one-shot impulse to inject at startup, `x,y,pressure,radius`; may
    /// be given multiple times
    #[arg(long)]
    impulse: Vec<String>,
}

fn parse_impulse(spec: &str) -> anyhow::Result<(u32, u32, f32, i32)> {
    let parts: Vec<&str> = spec.split(',').collect();
    if parts.len() != 4 {
        anyhow::bail!("invalid impulse spec '{spec}', expected x,y,pressure,radius");
    }
    Ok((parts[0].parse()?, parts[1].parse()?, parts[2].parse()?, parts[3].parse()?))
}

fn resolve_preset(name: &str) -> anyhow::Result<fathom_core::DampingPreset> {
    Ok(match name {
        "realistic" => fathom_core::DampingPreset::realistic(),
        "visualization" => fathom_core::DampingPreset::visualization(),
        "anechoic" => fathom_core::DampingPreset::anechoic(),
        other => fathom_config::load_named_preset(other)?,
    })
}

/// Reads scripted commands off stdin, one per line, until EOF:
///
/// - `impulse x y pressure radius`
/// - `time-scale factor`
/// - `quit`
///
/// Runs on its own thread so the main loop's frame ticking never blocks on
/// terminal input.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines().map_while(Result::ok) {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn apply_command(
    sim: &mut Simulator,
    line: &str,
    running: &Arc<AtomicBool>,
    time_scale: &mut f32,
) {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["quit"] | ["exit"] => running.store(false, Ordering::SeqCst),
        ["impulse", x, y, pressure, radius] => {
            match (x.parse(), y.parse(), pressure.parse(), radius.parse()) {
                (Ok(x), Ok(y), Ok(pressure), Ok(radius)) => {
                    if let Err(error) = sim.add_impulse(x, y, pressure, radius) {
                        tracing::warn!(%error, "rejected impulse command from stdin");
                    }
                }
                _ => tracing::warn!(line, "malformed impulse command"),
            }
        }
        ["time-scale", scale] => match scale.parse() {
            Ok(scale) if scale > 0.0 => *time_scale = scale,
            _ => tracing::warn!(line, "malformed time-scale command"),
        },
        [] => {}
        _ => tracing::warn!(line, "unrecognized stdin command"),
    }
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let (width, height, layout) = match &args.layout {
        Some(name) => {
            let layout = fathom_config::load_layout(name)
                .or_else(|_| RoomLayout::load(name))?;
            (layout.width, layout.height, Some(layout))
        }
        None => (args.width, args.height, None),
    };

    let mut sim = Simulator::new(width, height);

    if let Some(layout) = &layout {
        sim.load_obstacles(&layout.mask)?;
        if let Some(listener) = layout.listener {
            sim.set_listener_position(listener.x, listener.y);
        }
    }
    sim.set_listener_enabled(true);
    sim.apply_preset(resolve_preset(&args.preset)?);

    for spec in &args.impulse {
        let (x, y, pressure, radius) = parse_impulse(spec)?;
        sim.add_impulse(x, y, pressure, radius)?;
    }

    let mut bridge = AudioBridge::new(args.sample_rate);
    bridge.set_gain(args.gain.max(0.0));
    let _stream = AudioOutputStream::open(args.output.as_deref(), &bridge)?;

    println!("Running fathom on a {width}x{height} grid, preset '{}'.", args.preset);
    println!("Press Ctrl+C or type 'quit' to stop.\n");

    let running = Arc::new(AtomicBool::new(true));
    let ctrlc_running = Arc::clone(&running);
    ctrlc::set_handler(move || ctrlc_running.store(false, Ordering::SeqCst))?;

    let stdin_commands = spawn_stdin_reader();

    let frame_duration = 1.0 / args.frame_rate.max(1.0);
    let tick = Duration::from_secs_f32(frame_duration);
    let mut elapsed_simulated = 0.0f32;
    let mut time_scale = args.time_scale.max(1e-9);

    while running.load(Ordering::SeqCst) {
        while let Ok(line) = stdin_commands.try_recv() {
            apply_command(&mut sim, &line, &running, &mut time_scale);
        }

        let started = Instant::now();
        let stats = sim.advance(frame_duration);
        let frame = sim.take_listener_frame();
        if !frame.is_empty() {
            bridge.submit_listener_samples(&frame, stats.plan.dt, time_scale);
        }

        elapsed_simulated += frame_duration;
        if let Some(duration) = args.duration {
            if elapsed_simulated >= duration {
                break;
            }
        }

        if let Some(remaining) = tick.checked_sub(started.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    println!("Stopped after {elapsed_simulated:.2}s of simulated time.");
    Ok(())
}
