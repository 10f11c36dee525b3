//! Fathom CLI - headless command-line driver for the acoustic FDTD solver.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fathom")]
#[command(author, version, about = "Fathom acoustic FDTD solver CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a headless simulation with audio output
    Run(commands::run::RunArgs),

    /// List and manage audio devices
    Devices(commands::devices::DevicesArgs),

    /// Manage damping presets and room layouts
    Presets(commands::presets::PresetsArgs),

    /// Measure sub-step throughput
    Bench(commands::bench::BenchArgs),
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    tracing::debug!(command = ?std::mem::discriminant(&cli.command), "dispatching command");

    match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Devices(args) => commands::devices::run(args),
        Commands::Presets(args) => commands::presets::run(args),
        Commands::Bench(args) => commands::bench::run(args),
    }
}
