//! Audio device listing command.

use clap::{Args, Subcommand};
use fathom_audio::{default_output_device, list_output_devices};

#[derive(Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    command: Option<DevicesCommand>,
}

#[derive(Subcommand)]
enum DevicesCommand {
    /// List all available output devices
    List,
    /// Show the default output device
    Info,
}

pub fn run(args: DevicesArgs) -> anyhow::Result<()> {
    match args.command.unwrap_or(DevicesCommand::List) {
        DevicesCommand::List => {
            let devices = list_output_devices()?;

            if devices.is_empty() {
                println!("No output devices found.");
                return Ok(());
            }

            println!("Available Output Devices");
            println!("=========================\n");
            for (idx, device) in devices.iter().enumerate() {
                println!("  [{}] {} ({} Hz)", idx, device.name, device.default_sample_rate);
            }
            println!();
            println!("Tip: pass a device index or partial name to `fathom run --output`.");
        }
        DevicesCommand::Info => match default_output_device() {
            Some(device) => {
                println!("Default Output:");
                println!("  Name: {}", device.name);
                println!("  Sample Rate: {} Hz", device.default_sample_rate);
            }
            None => println!("Default Output: None"),
        },
    }

    Ok(())
}
