//! Keybinding configuration types and parsing.
//!
//! Maps user-configurable key combinations to the engine commands the
//! overlay exposes through its keyboard dispatch table.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Every command that can be bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    // Tool selection (selecting the active tool deselects it)
    SelectPen,
    SelectErase,
    SelectText,
    SelectBox,

    // History
    Undo,
    Redo,
    Clear,

    // Overlay chrome
    ToggleOverlay,
    ToggleDock,

    // Export
    CopyExport,
    SaveExport,

    Cancel,
}

/// A single keybinding: a key name with optional modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyBinding {
    /// Parse a keybinding string like "Ctrl+Shift+Z" or "Escape".
    /// Modifiers can appear in any order and spaces around '+' are ignored.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Empty keybinding string".to_string());
        }

        let normalized = s.replace(" + ", "+").replace("+ ", "+").replace(" +", "+");

        let mut ctrl = false;
        let mut shift = false;
        let mut alt = false;
        let mut key_parts = Vec::new();

        for part in normalized.split('+') {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => ctrl = true,
                "shift" => shift = true,
                "alt" => alt = true,
                _ => key_parts.push(part),
            }
        }

        if key_parts.is_empty() {
            return Err(format!("No key specified in: {}", s));
        }

        // "Ctrl++" splits into trailing empty parts: the key is '+'
        let key = key_parts.join("+");
        let key = if key.chars().all(|c| c == '+') {
            "+".to_string()
        } else {
            key
        };

        // Normalize key case so "ctrl+z" and "Ctrl+Z" hash identically
        let key = if key.chars().count() == 1 {
            key.to_uppercase()
        } else {
            key
        };

        Ok(Self {
            key,
            ctrl,
            shift,
            alt,
        })
    }

    /// Check if this keybinding matches the current input state.
    pub fn matches(&self, key: &str, ctrl: bool, shift: bool, alt: bool) -> bool {
        self.key.eq_ignore_ascii_case(key)
            && self.ctrl == ctrl
            && self.shift == shift
            && self.alt == alt
    }
}

/// Configuration for all keybindings.
///
/// Each command can have multiple keybindings:
/// ```toml
/// [keybindings]
/// undo = ["Ctrl+Z"]
/// redo = ["Ctrl+Shift+Z", "Ctrl+Y"]
/// select_pen = ["P"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KeybindingsConfig {
    #[serde(default = "default_select_pen")]
    pub select_pen: Vec<String>,

    #[serde(default = "default_select_erase")]
    pub select_erase: Vec<String>,

    #[serde(default = "default_select_text")]
    pub select_text: Vec<String>,

    #[serde(default = "default_select_box")]
    pub select_box: Vec<String>,

    #[serde(default = "default_undo")]
    pub undo: Vec<String>,

    #[serde(default = "default_redo")]
    pub redo: Vec<String>,

    #[serde(default = "default_clear")]
    pub clear: Vec<String>,

    #[serde(default = "default_toggle_overlay")]
    pub toggle_overlay: Vec<String>,

    #[serde(default = "default_toggle_dock")]
    pub toggle_dock: Vec<String>,

    #[serde(default = "default_copy_export")]
    pub copy_export: Vec<String>,

    #[serde(default = "default_save_export")]
    pub save_export: Vec<String>,

    #[serde(default = "default_cancel")]
    pub cancel: Vec<String>,
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            select_pen: default_select_pen(),
            select_erase: default_select_erase(),
            select_text: default_select_text(),
            select_box: default_select_box(),
            undo: default_undo(),
            redo: default_redo(),
            clear: default_clear(),
            toggle_overlay: default_toggle_overlay(),
            toggle_dock: default_toggle_dock(),
            copy_export: default_copy_export(),
            save_export: default_save_export(),
            cancel: default_cancel(),
        }
    }
}

impl KeybindingsConfig {
    /// Build a lookup map from keybindings to commands.
    /// Returns an error if any keybinding string is invalid or if duplicates are detected.
    pub fn build_command_map(&self) -> Result<HashMap<KeyBinding, Command>, String> {
        let mut map = HashMap::new();

        let groups: [(&[String], Command); 12] = [
            (&self.select_pen, Command::SelectPen),
            (&self.select_erase, Command::SelectErase),
            (&self.select_text, Command::SelectText),
            (&self.select_box, Command::SelectBox),
            (&self.undo, Command::Undo),
            (&self.redo, Command::Redo),
            (&self.clear, Command::Clear),
            (&self.toggle_overlay, Command::ToggleOverlay),
            (&self.toggle_dock, Command::ToggleDock),
            (&self.copy_export, Command::CopyExport),
            (&self.save_export, Command::SaveExport),
            (&self.cancel, Command::Cancel),
        ];

        for (bindings, command) in groups {
            for binding_str in bindings {
                let binding = KeyBinding::parse(binding_str)?;
                if let Some(existing) = map.insert(binding, command) {
                    return Err(format!(
                        "Duplicate keybinding '{}' assigned to both {:?} and {:?}",
                        binding_str, existing, command
                    ));
                }
            }
        }

        Ok(map)
    }
}

// =============================================================================
// Default keybinding functions
// =============================================================================

fn default_select_pen() -> Vec<String> {
    vec!["P".to_string()]
}

fn default_select_erase() -> Vec<String> {
    vec!["E".to_string()]
}

fn default_select_text() -> Vec<String> {
    vec!["T".to_string()]
}

fn default_select_box() -> Vec<String> {
    vec!["B".to_string()]
}

fn default_undo() -> Vec<String> {
    vec!["Ctrl+Z".to_string()]
}

fn default_redo() -> Vec<String> {
    vec!["Ctrl+Shift+Z".to_string(), "Ctrl+Y".to_string()]
}

fn default_clear() -> Vec<String> {
    vec!["Ctrl+Shift+X".to_string()]
}

fn default_toggle_overlay() -> Vec<String> {
    vec!["Ctrl+Shift+A".to_string()]
}

fn default_toggle_dock() -> Vec<String> {
    vec!["D".to_string()]
}

fn default_copy_export() -> Vec<String> {
    vec!["Ctrl+Shift+C".to_string()]
}

fn default_save_export() -> Vec<String> {
    vec!["Ctrl+S".to_string()]
}

fn default_cancel() -> Vec<String> {
    vec!["Escape".to_string()]
}
