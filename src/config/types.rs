//! Configuration type definitions.

use super::enums::{ColorSpec, ExportFormat};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Drawing-related settings.
///
/// Controls the default appearance of the pen, box and text tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DrawingConfig {
    /// Default color - either a named color (red, green, blue, yellow, orange, pink, white, black)
    /// or an RGB array like `[255, 0, 0]` for red
    #[serde(default = "default_color")]
    pub default_color: ColorSpec,

    /// Pen and eraser nominal width in logical pixels (valid range: 1.0 - 40.0)
    #[serde(default = "default_pen_width")]
    pub pen_width: f64,

    /// Box outline width in logical pixels (valid range: 1.0 - 40.0)
    #[serde(default = "default_box_width")]
    pub box_width: f64,

    /// Font size for new text blocks in logical pixels (valid range: 8.0 - 96.0)
    #[serde(default = "default_font_size")]
    pub default_font_size: f64,

    /// Font family name for text rendering (e.g., "Sans", "Monospace", "JetBrains Mono")
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Font weight (e.g., "normal", "bold", "light", or numeric 100-900)
    #[serde(default = "default_font_weight")]
    pub font_weight: String,

    /// Font style (e.g., "normal", "italic", "oblique")
    #[serde(default = "default_font_style")]
    pub font_style: String,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
            pen_width: default_pen_width(),
            box_width: default_box_width(),
            default_font_size: default_font_size(),
            font_family: default_font_family(),
            font_weight: default_font_weight(),
            font_style: default_font_style(),
        }
    }
}

/// Overlay presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OverlayConfig {
    /// Whether the overlay starts visible when no stored preference exists
    #[serde(default = "default_true")]
    pub visible_by_default: bool,

    /// Whether the tool dock starts open
    #[serde(default = "default_true")]
    pub dock_open_by_default: bool,

    /// Preference-store key holding the persisted visibility flag
    #[serde(default = "default_visibility_key")]
    pub visibility_key: String,

    /// Device pixel ratio of the annotation buffer (valid range: 0.5 - 4.0)
    #[serde(default = "default_device_scale")]
    pub device_scale: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            visible_by_default: true,
            dock_open_by_default: true,
            visibility_key: default_visibility_key(),
            device_scale: default_device_scale(),
        }
    }
}

/// Screenshot export settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportConfig {
    /// Directory for saved exports (`~` is expanded)
    #[serde(default = "default_save_directory")]
    pub save_directory: String,

    /// chrono format string used to build file names (without extension)
    #[serde(default = "default_filename_template")]
    pub filename_template: String,

    /// Encoded image format
    #[serde(default)]
    pub format: ExportFormat,

    /// Upper bound for acquiring the background snapshot, in milliseconds
    #[serde(default = "default_snapshot_timeout_ms")]
    pub snapshot_timeout_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            save_directory: default_save_directory(),
            filename_template: default_filename_template(),
            format: ExportFormat::default(),
            snapshot_timeout_ms: default_snapshot_timeout_ms(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_color() -> ColorSpec {
    ColorSpec::Name("red".to_string())
}

fn default_pen_width() -> f64 {
    3.0
}

fn default_box_width() -> f64 {
    2.0
}

fn default_font_size() -> f64 {
    20.0
}

fn default_font_family() -> String {
    "Sans".to_string()
}

fn default_font_weight() -> String {
    "normal".to_string()
}

fn default_font_style() -> String {
    "normal".to_string()
}

fn default_true() -> bool {
    true
}

fn default_visibility_key() -> String {
    "overlay.visible".to_string()
}

fn default_device_scale() -> f64 {
    1.0
}

fn default_save_directory() -> String {
    "~/Pictures/Overscribe".to_string()
}

fn default_filename_template() -> String {
    "annotation_%Y-%m-%d_%H%M%S".to_string()
}

fn default_snapshot_timeout_ms() -> u64 {
    5000
}
