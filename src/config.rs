//! Persisted user settings.
//!
//! Handles loading, validating, merging and saving `settings.toml`. Stock
//! defaults are the base layer; the user's file only needs the keys it
//! overrides.
//!
//! ## Settings File Location
//!
//! `settings.toml` lives in the config directory (`--config-dir`, default
//! `.photo-grid`). A missing file means "all defaults".
//!
//! ## Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! layout = "2x2"            # "2x1" or "2x2"
//! last_folder = ""          # Folder photos were last added from
//!
//! [title]
//! font_size = 14            # Page title size in points (1-72)
//! bold = true
//! underline = true
//!
//! [caption]
//! prefix = "Photo"          # Captions default to "<prefix> <n>"
//! font_size = 10
//! bold = false
//! underline = false
//!
//! [header]
//! text = ""                 # Single centered line; blank = no header
//!
//! [footer]
//! line1 = "File Ref. :"
//! line2 = "Photo taken on 01.01.2026"   # Defaults to today's date
//!
//! [processing]
//! max_processes = 4         # Max parallel compressions (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::document::TextStyle;
use crate::layout::LayoutMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the settings file inside the config directory.
pub const SETTINGS_FILE: &str = "settings.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// User settings loaded from `settings.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Grid layout used for new projects.
    pub layout: LayoutMode,
    /// Folder photos were last added from. Empty when never set.
    pub last_folder: String,
    /// Page title style.
    pub title: TitleConfig,
    /// Caption prefix and style.
    pub caption: CaptionConfig,
    /// Page header text.
    pub header: HeaderConfig,
    /// Two-line page footer.
    pub footer: FooterConfig,
    /// Parallel compression settings.
    pub processing: ProcessingConfig,
}

/// Largest title or caption size, in points. A one-line title this size
/// still fits above two grid rows on one page.
pub const MAX_FONT_SIZE: u32 = 72;

impl Settings {
    /// Validate values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, size) in [
            ("title.font_size", self.title.font_size),
            ("caption.font_size", self.caption.font_size),
        ] {
            if !(1..=MAX_FONT_SIZE).contains(&size) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be 1-{MAX_FONT_SIZE}"
                )));
            }
        }
        if self.caption.prefix.trim().is_empty() {
            return Err(ConfigError::Validation(
                "caption.prefix must not be blank".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TitleConfig {
    pub font_size: u32,
    pub bold: bool,
    pub underline: bool,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            font_size: 14,
            bold: true,
            underline: true,
        }
    }
}

impl TitleConfig {
    pub fn style(&self) -> TextStyle {
        TextStyle {
            size: self.font_size as f32,
            bold: self.bold,
            underline: self.underline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptionConfig {
    /// Default captions read `"<prefix> <n>"`.
    pub prefix: String,
    pub font_size: u32,
    pub bold: bool,
    pub underline: bool,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            prefix: "Photo".to_string(),
            font_size: 10,
            bold: false,
            underline: false,
        }
    }
}

impl CaptionConfig {
    pub fn style(&self) -> TextStyle {
        TextStyle {
            size: self.font_size as f32,
            bold: self.bold,
            underline: self.underline,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderConfig {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FooterConfig {
    pub line1: String,
    pub line2: String,
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            line1: "File Ref. :".to_string(),
            line2: default_footer_line2(),
        }
    }
}

/// `"Photo taken on <today>"` with the date as `dd.mm.yyyy`.
pub fn default_footer_line2() -> String {
    format!(
        "Photo taken on {}",
        chrono::Local::now().format("%d.%m.%Y")
    )
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel compression workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Settings loading, merging, saving and validation
// =============================================================================

/// Returns the stock default settings as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(Settings::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

pub fn settings_path(dir: &Path) -> PathBuf {
    dir.join(SETTINGS_FILE)
}

/// Load `settings.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_settings(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let path = settings_path(dir);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_settings(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Settings, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let settings: Settings = merged.try_into()?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from `settings.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_settings(dir: &Path) -> Result<Settings, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_settings(dir)?;
    resolve_settings(base, overlay)
}

/// Write the full settings to `settings.toml`, creating the directory.
pub fn save_settings(dir: &Path, settings: &Settings) -> Result<(), ConfigError> {
    settings.validate()?;
    fs::create_dir_all(dir)?;
    let content = toml::to_string_pretty(settings)?;
    fs::write(settings_path(dir), content)?;
    Ok(())
}

/// Returns a fully-commented stock `settings.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Photo Grid Settings
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Grid layout: "2x1" (two photos per page) or "2x2" (four photos per page).
layout = "2x2"

# Folder photos were last added from. Updated by `photo-grid add`.
last_folder = ""

# ---------------------------------------------------------------------------
# Page title (one per page, above the grid)
# ---------------------------------------------------------------------------
[title]
# Font size in points, 1-72. Titles longer than one line are cut off
# with "...".
font_size = 14
bold = true
underline = true

# ---------------------------------------------------------------------------
# Captions (below each photo)
# ---------------------------------------------------------------------------
[caption]
# Default captions read "<prefix> <n>", numbered across all pages.
prefix = "Photo"
# Font size in points, 1-72.
font_size = 10
bold = false
underline = false

# ---------------------------------------------------------------------------
# Header and footer (repeated on every page)
# ---------------------------------------------------------------------------
[header]
# Single centered line. Leave blank for no header.
text = ""

[footer]
# Two left-aligned lines. Blank lines are omitted.
line1 = "File Ref. :"
# Defaults to "Photo taken on <today's date>".
# line2 = "Photo taken on 01.01.2026"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image compressions.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
