//! Platform-specific paths for damping presets and room layouts.
//!
//! # Directory structure
//!
//! - User presets: `~/.config/fathom/presets/` (Linux), `~/Library/Application
//!   Support/fathom/presets/` (macOS), `%APPDATA%\fathom\presets\` (Windows)
//! - User room layouts: `~/.config/fathom/layouts/` (and platform equivalents)
//! - System presets: `/usr/share/fathom/presets/` (Linux)

use std::path::PathBuf;

use crate::error::ConfigError;

const APP_NAME: &str = "fathom";
const PRESETS_SUBDIR: &str = "presets";
const LAYOUTS_SUBDIR: &str = "layouts";

/// The user-specific damping preset directory.
pub fn user_presets_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(PRESETS_SUBDIR)
}

/// The user-specific room layout directory.
pub fn user_layouts_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(LAYOUTS_SUBDIR)
}

/// The user-specific configuration directory.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// The system-wide, typically read-only, damping preset directory.
pub fn system_presets_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        PathBuf::from("/usr/share").join(APP_NAME).join(PRESETS_SUBDIR)
    }
    #[cfg(target_os = "macos")]
    {
        PathBuf::from("/Library/Application Support").join(APP_NAME).join(PRESETS_SUBDIR)
    }
    #[cfg(target_os = "windows")]
    {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData"))
            .join(APP_NAME)
            .join(PRESETS_SUBDIR)
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME)
            .join(PRESETS_SUBDIR)
    }
}

/// Finds a damping preset by name or path.
///
/// Searches, in order: the given string as a literal file path, the user
/// presets directory, then the system presets directory. `.toml` is appended
/// to bare names automatically.
pub fn find_preset(name: &str) -> Option<PathBuf> {
    find_in(name, &user_presets_dir(), &system_presets_dir())
}

/// Finds a room layout by name or path.
///
/// Searches the given string as a literal file path, then the user layouts
/// directory. Layouts have no system-wide counterpart.
pub fn find_layout(name: &str) -> Option<PathBuf> {
    find_in(name, &user_layouts_dir(), &user_layouts_dir())
}

fn find_in(name: &str, user_dir: &std::path::Path, fallback_dir: &std::path::Path) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };

    let user_path = user_dir.join(&filename);
    if user_path.is_file() {
        return Some(user_path);
    }

    let fallback_path = fallback_dir.join(&filename);
    if fallback_path.is_file() {
        return Some(fallback_path);
    }

    None
}

/// Ensures the user presets directory exists, creating it if necessary.
pub fn ensure_user_presets_dir() -> Result<PathBuf, ConfigError> {
    ensure_dir(user_presets_dir())
}

/// Ensures the user layouts directory exists, creating it if necessary.
pub fn ensure_user_layouts_dir() -> Result<PathBuf, ConfigError> {
    ensure_dir(user_layouts_dir())
}

fn ensure_dir(dir: PathBuf) -> Result<PathBuf, ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

/// Lists all `.toml` files in the user presets directory.
pub fn list_user_presets() -> Vec<PathBuf> {
    list_toml_in_dir(&user_presets_dir())
}

/// Lists all `.toml` files in the system presets directory.
pub fn list_system_presets() -> Vec<PathBuf> {
    list_toml_in_dir(&system_presets_dir())
}

/// Lists all available damping presets, user presets first.
pub fn list_all_presets() -> Vec<PathBuf> {
    let mut presets = list_user_presets();
    presets.extend(list_system_presets());
    presets
}

/// Lists all `.toml` files in the user layouts directory.
pub fn list_user_layouts() -> Vec<PathBuf> {
    list_toml_in_dir(&user_layouts_dir())
}

fn list_toml_in_dir(dir: &std::path::Path) -> Vec<PathBuf> {
    if !dir.exists() {
        return Vec::new();
    }

    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect()
}

/// Extracts the file stem of a path as a preset or layout name.
pub fn name_from_path(path: &std::path::Path) -> Option<String> {
    path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
}
