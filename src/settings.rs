//! Tool settings.
//!
//! Optional `sleep-screen.toml` holding the defaults the CLI falls back to
//! when a flag is not given. Stock defaults are overridden by whatever the
//! file sets; command-line flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [target]
//! width = 1620              # reMarkable 2 panel
//! height = 2160
//!
//! [border]
//! default_thickness = 30    # Used when --border is given without a value
//! inset = false             # true: keep the final image at the target size
//!
//! [overlay]
//! directory = "text_overlay_images"
//! default_file = "text_overlay.png"
//! buffer = 0                # Pixels from the nearest edges
//! position = "lower_right"
//!
//! [device]
//! config_file = "config/remarkable_config.txt"
//! staged_file_name = "suspended.png"
//! ping_timeout_secs = 2
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::imaging::{Border, OverlayPosition, TargetResolution};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when `--settings` is not given.
pub const DEFAULT_SETTINGS_FILE: &str = "sleep-screen.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Output resolution before any outset border.
    pub target: TargetResolution,
    pub border: BorderSettings,
    pub overlay: OverlaySettings,
    pub device: DeviceSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BorderSettings {
    /// Thickness applied by a bare `--border`.
    pub default_thickness: u32,
    /// Shrink the photo so photo + border equals the target size.
    pub inset: bool,
}

impl Default for BorderSettings {
    fn default() -> Self {
        Self {
            default_thickness: Border::DEFAULT_THICKNESS,
            inset: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlaySettings {
    /// Directory overlay file names are resolved against.
    pub directory: PathBuf,
    /// File used by a bare `--textfile`.
    pub default_file: String,
    pub buffer: u32,
    pub position: OverlayPosition,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("text_overlay_images"),
            default_file: "text_overlay.png".to_string(),
            buffer: 0,
            position: OverlayPosition::default(),
        }
    }
}

impl OverlaySettings {
    /// Resolve an overlay file name. Absolute paths pass through.
    pub fn resolve(&self, file_name: &str) -> PathBuf {
        let p = Path::new(file_name);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.directory.join(p)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceSettings {
    /// `KEY=VALUE` device config consumed by `move`, `push` and `install`.
    pub config_file: PathBuf,
    /// Name the composite is staged under in `SOURCE_PATH`.
    pub staged_file_name: String,
    pub ping_timeout_secs: u64,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            config_file: PathBuf::from("config/remarkable_config.txt"),
            staged_file_name: "suspended.png".to_string(),
            ping_timeout_secs: 2,
        }
    }
}

impl Settings {
    /// Validate values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.width == 0 || self.target.height == 0 {
            return Err(ConfigError::Validation(
                "target.width and target.height must be positive".into(),
            ));
        }
        if self.device.staged_file_name.is_empty()
            || self.device.staged_file_name.contains(['/', '\\'])
        {
            return Err(ConfigError::Validation(
                "device.staged_file_name must be a bare file name".into(),
            ));
        }
        if self.device.ping_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "device.ping_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Loading, merging, and validation
// =============================================================================

/// Returns the stock default settings as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Settings::default()).expect("default settings must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
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

/// Parse settings text on top of the stock defaults and validate.
pub fn parse_settings(content: &str) -> Result<Settings, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let settings: Settings = merge_toml(stock_defaults_value(), overlay).try_into()?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from `path`.
///
/// A missing file yields the stock defaults; a present but invalid file is
/// an error.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    parse_settings(&fs::read_to_string(path)?)
}

/// Returns a fully-commented stock settings file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_settings_toml() -> &'static str {
    r##"# sleep-screen settings
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output resolution (reMarkable 2 panel)
# ---------------------------------------------------------------------------
[target]
width = 1620
height = 2160

# ---------------------------------------------------------------------------
# White border
# ---------------------------------------------------------------------------
[border]
# Thickness in pixels when --border is passed without a value.
default_thickness = 30

# false: the border is added around the resized image, so the output is
#        target + 2 * thickness in each direction.
# true:  the image is resized smaller first so the output stays exactly
#        at the target resolution.
inset = false

# ---------------------------------------------------------------------------
# Text overlay
# ---------------------------------------------------------------------------
[overlay]
# Directory that --textfile names are resolved against.
directory = "text_overlay_images"

# File used when --textfile is passed without a value.
default_file = "text_overlay.png"

# Distance in pixels from the nearest edges.
buffer = 0

# upper_left, upper_middle, upper_right,
# middle_left, middle_middle, middle_right,
# lower_left, lower_middle, lower_right
position = "lower_right"

# ---------------------------------------------------------------------------
# Device transfer
# ---------------------------------------------------------------------------
[device]
# KEY=VALUE file with REMARKABLE_IP, REMARKABLE_PASSWORD, SOURCE_PATH,
# DESTINATION_DIR, PUTTY_PATH and DESTINATION_FILE.
config_file = "config/remarkable_config.txt"

# Name the processed image is staged under inside SOURCE_PATH.
staged_file_name = "suspended.png"

# Seconds to wait for a ping reply before giving up.
ping_timeout_secs = 2
"##
}
