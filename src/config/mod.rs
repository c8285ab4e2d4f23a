//! Configuration file support for overscribe.
//!
//! Settings are loaded from `~/.config/overscribe/config.toml`: drawing
//! defaults, overlay behavior, export destinations and keybindings. A missing
//! file yields the defaults; out-of-range values are clamped with a warning.

pub mod enums;
pub mod keybindings;
pub mod types;

pub use enums::{ColorSpec, ExportFormat};
pub use keybindings::{Command, KeyBinding, KeybindingsConfig};
pub use types::{DrawingConfig, ExportConfig, OverlayConfig};

use anyhow::{Context, Result};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// [drawing]
/// default_color = "red"
/// pen_width = 3.0
/// default_font_size = 20.0
///
/// [overlay]
/// visible_by_default = true
/// device_scale = 2.0
///
/// [export]
/// save_directory = "~/Pictures/Overscribe"
/// filename_template = "annotation_%Y-%m-%d_%H%M%S"
///
/// [keybindings]
/// undo = ["Ctrl+Z"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Tool defaults (color, widths, font)
    #[serde(default)]
    pub drawing: DrawingConfig,

    /// Overlay visibility, dock and device scale
    #[serde(default)]
    pub overlay: OverlayConfig,

    /// Screenshot export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Keyboard shortcuts
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Validated ranges:
    /// - `pen_width`, `box_width`: 1.0 - 40.0
    /// - `default_font_size`: 8.0 - 96.0
    /// - `device_scale`: 0.5 - 4.0
    /// - `snapshot_timeout_ms`: 100 - 60000
    pub fn validate_and_clamp(&mut self) {
        clamp_setting("pen_width", &mut self.drawing.pen_width, 1.0, 40.0);
        clamp_setting("box_width", &mut self.drawing.box_width, 1.0, 40.0);
        clamp_setting(
            "default_font_size",
            &mut self.drawing.default_font_size,
            8.0,
            96.0,
        );
        clamp_setting("device_scale", &mut self.overlay.device_scale, 0.5, 4.0);

        if !(100..=60_000).contains(&self.export.snapshot_timeout_ms) {
            log::warn!(
                "Invalid snapshot_timeout_ms {}, clamping to 100-60000 range",
                self.export.snapshot_timeout_ms
            );
            self.export.snapshot_timeout_ms = self.export.snapshot_timeout_ms.clamp(100, 60_000);
        }

        let valid_weight = matches!(
            self.drawing.font_weight.to_lowercase().as_str(),
            "normal" | "bold" | "light" | "ultralight" | "heavy" | "ultrabold"
        ) || self
            .drawing
            .font_weight
            .parse::<u32>()
            .is_ok_and(|w| (100..=900).contains(&w));

        if !valid_weight {
            log::warn!(
                "Invalid font_weight '{}', falling back to 'normal'",
                self.drawing.font_weight
            );
            self.drawing.font_weight = "normal".to_string();
        }

        if !matches!(
            self.drawing.font_style.to_lowercase().as_str(),
            "normal" | "italic" | "oblique"
        ) {
            log::warn!(
                "Invalid font_style '{}', falling back to 'normal'",
                self.drawing.font_style
            );
            self.drawing.font_style = "normal".to_string();
        }

        if self.overlay.visibility_key.trim().is_empty() {
            log::warn!("Empty visibility_key, falling back to 'overlay.visible'");
            self.overlay.visibility_key = OverlayConfig::default().visibility_key;
        }

        if self.export.filename_template.trim().is_empty() {
            log::warn!("Empty filename_template, using default");
            self.export.filename_template = ExportConfig::default().filename_template;
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("overscribe");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if
    /// the file does not exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from `path`, or returns defaults if it does not
    /// exist. All loaded values are validated and clamped.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config = Self::from_toml_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(source)?;
        config.validate_and_clamp();
        Ok(config)
    }

    /// Saves the configuration to the default location, creating the parent
    /// directory if needed.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// JSON schema describing the configuration file.
    pub fn schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}

fn clamp_setting(name: &str, value: &mut f64, min: f64, max: f64) {
    if !(min..=max).contains(value) {
        log::warn!(
            "Invalid {} {:.1}, clamping to {:.1}-{:.1} range",
            name,
            value,
            min,
            max
        );
        // NaN fails `contains` and survives `clamp`
        *value = if value.is_nan() {
            min
        } else {
            value.clamp(min, max)
        };
    }
}
