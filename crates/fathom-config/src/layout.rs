//! TOML persistence for named room layouts.
//!
//! A layout is an obstacle mask plus the grid's dimensions and a default
//! listener/source placement, so that `fathom run --layout name` can
//! reconstruct a scene without the caller specifying every coordinate by
//! hand. The mask is stored as a base64-free byte list keyed by TOML's
//! native array-of-integers support, matching the corpus's preference for
//! plain TOML scalars over binary blobs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A grid coordinate pair, used for a layout's default listener and source
/// placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPoint {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

/// A named, persisted room layout: an obstacle mask plus default placements.
///
/// # TOML format
///
/// ```toml
/// name = "concert_hall"
/// width = 256
/// height = 128
/// listener = { x = 128, y = 64 }
/// sources = [{ x = 10, y = 64 }]
/// mask = [0, 0, 0, 1, 1, 0]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomLayout {
    /// Name the layout is saved and looked up under.
    pub name: String,
    /// Grid width, in cells.
    pub width: u32,
    /// Grid height, in cells.
    pub height: u32,
    /// Default listener placement.
    #[serde(default)]
    pub listener: Option<GridPoint>,
    /// Default continuous-source placements.
    #[serde(default)]
    pub sources: Vec<GridPoint>,
    /// Row-major obstacle mask, `width * height` bytes; non-zero marks an
    /// obstacle cell.
    pub mask: Vec<u8>,
}

impl RoomLayout {
    /// Builds a layout from an already-rasterized mask, validating that its
    /// length matches `width * height`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DimensionMismatch`] if `mask.len() != width *
    /// height`.
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        mask: Vec<u8>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        let expected = (width as usize) * (height as usize);
        if mask.len() != expected {
            return Err(ConfigError::DimensionMismatch {
                name,
                expected,
                actual: mask.len(),
            });
        }
        Ok(Self {
            name,
            width,
            height,
            listener: None,
            sources: Vec::new(),
            mask,
        })
    }

    /// Sets the default listener placement.
    pub fn with_listener(mut self, x: u32, y: u32) -> Self {
        self.listener = Some(GridPoint { x, y });
        self
    }

    /// Adds a default source placement.
    pub fn with_source(mut self, x: u32, y: u32) -> Self {
        self.sources.push(GridPoint { x, y });
        self
    }

    /// Loads a layout from a TOML file, validating mask/dimension
    /// consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadFile`], [`ConfigError::TomlParse`], or
    /// [`ConfigError::DimensionMismatch`] as appropriate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let layout: Self = toml::from_str(&content)?;
        let expected = (layout.width as usize) * (layout.height as usize);
        if layout.mask.len() != expected {
            return Err(ConfigError::DimensionMismatch {
                name: layout.name.clone(),
                expected,
                actual: layout.mask.len(),
            });
        }
        Ok(layout)
    }

    /// Saves this layout to a TOML file, creating parent directories as
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

/// Saves `layout` in the user layouts directory under its own name, returning
/// the path it was written to.
///
/// # Errors
///
/// See [`RoomLayout::save`].
pub fn save_layout(layout: &RoomLayout) -> Result<std::path::PathBuf, ConfigError> {
    let dir = crate::paths::ensure_user_layouts_dir()?;
    let path = dir.join(format!("{}.toml", layout.name));
    layout.save(&path)?;
    tracing::info!(name = %layout.name, path = %path.display(), "saved room layout");
    Ok(path)
}

/// Loads a room layout by name from the user layouts directory.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownPreset`] if no file matches `name`, or a
/// read/parse/validation error if one does but cannot be loaded.
pub fn load_layout(name: &str) -> Result<RoomLayout, ConfigError> {
    let path = crate::paths::find_layout(name).ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))?;
    RoomLayout::load(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_mismatched_mask_length() {
        let err = RoomLayout::new("bad", 4, 4, vec![0; 3]);
        assert!(matches!(err, Err(ConfigError::DimensionMismatch { .. })));
    }

    #[test]
    fn new_accepts_correctly_sized_mask() {
        let layout = RoomLayout::new("ok", 2, 2, vec![0, 1, 0, 1]).unwrap();
        assert_eq!(layout.mask.len(), 4);
    }

    #[test]
    fn builder_sets_default_placements() {
        let layout = RoomLayout::new("placed", 8, 8, vec![0; 64])
            .unwrap()
            .with_listener(4, 4)
            .with_source(1, 1);
        assert_eq!(layout.listener, Some(GridPoint { x: 4, y: 4 }));
        assert_eq!(layout.sources, vec![GridPoint { x: 1, y: 1 }]);
    }

    #[test]
    fn save_then_load_round_trips_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("hall.toml");
        let layout = RoomLayout::new("hall", 4, 2, vec![0, 0, 1, 0, 0, 0, 0, 1])
            .unwrap()
            .with_listener(2, 1);
        layout.save(&path).unwrap();

        let loaded = RoomLayout::load(&path).unwrap();
        assert_eq!(loaded, layout);
    }

    #[test]
    fn load_rejects_a_hand_edited_file_with_wrong_dimensions() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "name = \"broken\"\nwidth = 4\nheight = 4\nmask = [0, 1]\n").unwrap();

        let err = RoomLayout::load(&path);
        assert!(matches!(err, Err(ConfigError::DimensionMismatch { .. })));
    }
}
