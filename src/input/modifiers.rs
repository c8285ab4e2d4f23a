//! Keyboard modifier state tracking.

/// Keyboard modifier state.
///
/// Tracks which modifier keys are currently held; consulted when matching
/// keybindings and when deciding whether Return finishes or breaks a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    /// Creates a new Modifiers instance with all keys released.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a command modifier (Ctrl or Alt) is held.
    pub fn has_command_modifier(&self) -> bool {
        self.ctrl || self.alt
    }
}
