//! Damping preset management commands.

use clap::{Args, Subcommand};
use fathom_config::{paths, save_named_preset, PresetFile};
use fathom_core::DampingPreset;

#[derive(Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: PresetsCommand,
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// List built-in and user damping presets
    List,

    /// Show a preset's coefficients
    Show {
        /// Preset name or path
        name: String,
    },

    /// Save a damping preset to the user presets directory
    Save {
        /// Name for the new preset
        name: String,

        /// Base built-in preset (`realistic`, `visualization`, `anechoic`)
        #[arg(long, conflicts_with_all = ["d", "r"])]
        base: Option<String>,

        /// Custom air energy retention, in `(0, 1]`
        #[arg(short = 'd', long)]
        d: Option<f32>,

        /// Custom wall reflection coefficient, in `[0, 1]`
        #[arg(short = 'r', long)]
        r: Option<f32>,

        /// Overwrite if the preset already exists
        #[arg(long)]
        force: bool,
    },

    /// Delete a user preset
    Delete {
        /// Preset name to delete
        name: String,
    },

    /// Show preset and layout directories
    Paths,
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    match args.command {
        PresetsCommand::List => list_presets(),
        PresetsCommand::Show { name } => show_preset(&name),
        PresetsCommand::Save { name, base, d, r, force } => save_preset(&name, base.as_deref(), d, r, force),
        PresetsCommand::Delete { name } => delete_preset(&name),
        PresetsCommand::Paths => show_paths(),
    }
}

fn built_in_presets() -> [(&'static str, DampingPreset); 3] {
    [
        ("realistic", DampingPreset::realistic()),
        ("visualization", DampingPreset::visualization()),
        ("anechoic", DampingPreset::anechoic()),
    ]
}

fn list_presets() -> anyhow::Result<()> {
    println!("Built-in Presets:");
    println!("=================");
    for (name, preset) in built_in_presets() {
        println!("  {:16} d={:.4} r={:.4}", name, preset.d, preset.r);
    }
    println!();

    println!("User Presets:");
    println!("=============");
    let user = paths::list_user_presets();
    if user.is_empty() {
        println!("  (none)");
    } else {
        for path in user {
            let name = paths::name_from_path(&path).unwrap_or_else(|| "unknown".to_string());
            match PresetFile::load(&path) {
                Ok(file) => println!("  {:16} d={:.4} r={:.4}", name, file.d, file.r),
                Err(_) => println!("  {name:16} (error loading)"),
            }
        }
    }

    Ok(())
}

fn resolve_by_name(name: &str) -> anyhow::Result<DampingPreset> {
    if let Some((_, preset)) = built_in_presets().into_iter().find(|(n, _)| *n == name) {
        return Ok(preset);
    }
    Ok(fathom_config::load_named_preset(name)?)
}

fn show_preset(name: &str) -> anyhow::Result<()> {
    let preset = resolve_by_name(name)?;
    println!("Preset: {name}");
    println!("  d (air energy retention): {}", preset.d);
    println!("  r (wall reflection):      {}", preset.r);
    println!("  absorbing boundary:       {}", preset.is_absorbing());
    Ok(())
}

fn save_preset(name: &str, base: Option<&str>, d: Option<f32>, r: Option<f32>, force: bool) -> anyhow::Result<()> {
    let existing = paths::find_preset(name);
    if existing.is_some() && !force {
        anyhow::bail!("preset '{name}' already exists; use --force to overwrite");
    }

    let preset = if let Some(base) = base {
        resolve_by_name(base)?
    } else {
        let d = d.ok_or_else(|| anyhow::anyhow!("--d is required unless --base is given"))?;
        let r = r.ok_or_else(|| anyhow::anyhow!("--r is required unless --base is given"))?;
        DampingPreset::custom(d, r)
    };

    let path = save_named_preset(name, preset)?;
    println!("Saved preset '{name}' to {}", path.display());
    Ok(())
}

fn delete_preset(name: &str) -> anyhow::Result<()> {
    if built_in_presets().iter().any(|(n, _)| *n == name) {
        anyhow::bail!("cannot delete built-in preset '{name}'");
    }

    let path = paths::user_presets_dir().join(format!("{name}.toml"));
    if !path.exists() {
        anyhow::bail!("user preset '{name}' not found");
    }

    std::fs::remove_file(&path)?;
    println!("Deleted preset '{name}'.");
    Ok(())
}

fn show_paths() -> anyhow::Result<()> {
    println!("User presets:   {}", paths::user_presets_dir().display());
    println!("System presets: {}", paths::system_presets_dir().display());
    println!("User layouts:   {}", paths::user_layouts_dir().display());
    println!("Config dir:     {}", paths::user_config_dir().display());
    Ok(())
}
