//! TOML persistence for [`DampingPreset`].
//!
//! Mirrors the retrieval corpus's own `Preset` load/save/round-trip shape,
//! applied to the much smaller `(kind, d, r)` value object instead of an
//! effect chain.

use std::path::Path;

use serde::{Deserialize, Serialize};

use fathom_core::{DampingPreset, PresetKind};

use crate::error::ConfigError;

/// On-disk TOML form of a [`PresetKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PresetKindFile {
    Realistic,
    Visualization,
    Anechoic,
    Custom,
}

impl From<PresetKind> for PresetKindFile {
    fn from(kind: PresetKind) -> Self {
        match kind {
            PresetKind::Realistic => Self::Realistic,
            PresetKind::Visualization => Self::Visualization,
            PresetKind::Anechoic => Self::Anechoic,
            PresetKind::Custom => Self::Custom,
        }
    }
}

/// A named, persisted [`DampingPreset`].
///
/// # TOML format
///
/// ```toml
/// name = "warm_room"
/// kind = "custom"
/// d = 0.996
/// r = 0.4
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetFile {
    /// Name the preset is saved and looked up under.
    pub name: String,
    kind: PresetKindFile,
    /// Per-step air energy retention.
    pub d: f32,
    /// Wall reflection coefficient.
    pub r: f32,
}

impl PresetFile {
    /// Wraps a named [`DampingPreset`] for persistence.
    pub fn new(name: impl Into<String>, preset: DampingPreset) -> Self {
        Self {
            name: name.into(),
            kind: preset.kind().into(),
            d: preset.d,
            r: preset.r,
        }
    }

    /// Reconstructs the in-memory [`DampingPreset`].
    ///
    /// Built-in kinds (`realistic`/`visualization`/`anechoic`) are
    /// reconstructed via their named constructors rather than
    /// `DampingPreset::custom`, so that a round-tripped preset still reports
    /// the same [`PresetKind`] as the one that was saved, even if the
    /// persisted `d`/`r` happen to have been hand-edited to match.
    pub fn to_preset(&self) -> DampingPreset {
        match self.kind {
            PresetKindFile::Realistic => DampingPreset::realistic(),
            PresetKindFile::Visualization => DampingPreset::visualization(),
            PresetKindFile::Anechoic => DampingPreset::anechoic(),
            PresetKindFile::Custom => DampingPreset::custom(self.d, self.r),
        }
    }

    /// Loads a named preset from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadFile`] if the file cannot be read or
    /// [`ConfigError::TomlParse`] if its contents are not valid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Ok(toml::from_str(&content)?)
    }

    /// Saves this preset to a TOML file, creating parent directories as
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CreateDir`], [`ConfigError::TomlSerialize`], or
    /// [`ConfigError::WriteFile`] as appropriate.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }
}

/// Saves `preset` under `name` in the user presets directory, returning the
/// path it was written to.
///
/// # Errors
///
/// See [`PresetFile::save`].
pub fn save_named_preset(name: &str, preset: DampingPreset) -> Result<std::path::PathBuf, ConfigError> {
    let dir = crate::paths::ensure_user_presets_dir()?;
    let path = dir.join(format!("{name}.toml"));
    PresetFile::new(name, preset).save(&path)?;
    tracing::info!(name, path = %path.display(), "saved damping preset");
    Ok(path)
}

/// Loads a damping preset by name, searching user then system directories.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownPreset`] if no file matches `name`, or a
/// read/parse error if one does but cannot be loaded.
pub fn load_named_preset(name: &str) -> Result<DampingPreset, ConfigError> {
    let path = crate::paths::find_preset(name).ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))?;
    Ok(PresetFile::load(path)?.to_preset())
}
