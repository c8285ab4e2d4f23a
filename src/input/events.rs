//! Host-independent input event types.

use serde::{Deserialize, Serialize};

/// Generic key representation.
///
/// Hosts map their native key codes to these values before forwarding
/// keyboard input to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Regular character key (a-z, 0-9, symbols)
    Char(char),
    Escape,
    Return,
    Backspace,
    Tab,
    Space,
    Shift,
    Ctrl,
    Alt,
    /// Unmapped or unrecognized key
    Unknown,
}

impl Key {
    /// Name used when matching against configured keybindings.
    pub fn binding_name(self) -> Option<String> {
        match self {
            Key::Char(c) => Some(c.to_string()),
            Key::Escape => Some("Escape".to_string()),
            Key::Return => Some("Return".to_string()),
            Key::Backspace => Some("Backspace".to_string()),
            Key::Tab => Some("Tab".to_string()),
            Key::Space => Some("Space".to_string()),
            Key::Shift | Key::Ctrl | Key::Alt | Key::Unknown => None,
        }
    }
}

/// Mouse button identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    /// Primary button (draws, drags, places text)
    #[default]
    Left,
    /// Secondary button (cancels the current draft)
    Right,
    Middle,
}

/// What the host should do with the native event after the engine saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerDisposition {
    /// Let the host apply its default handling (scrolling, selection, ...).
    Ignored,
    /// The overlay consumed the event; suppress default gestures.
    Captured,
}

impl PointerDisposition {
    pub fn is_captured(self) -> bool {
        self == PointerDisposition::Captured
    }
}

/// Pointer cursor the host should display over the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    Default,
    Crosshair,
    Text,
    /// Hovering a draggable text block
    Grab,
    /// Dragging a text block
    Grabbing,
}
