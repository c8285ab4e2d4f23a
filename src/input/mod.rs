//! Input handling and tool state machine.
//!
//! This module translates host pointer and keyboard events into annotation
//! actions. It owns the action history, the active tool, the single draft
//! slot and the open text session.

pub mod events;
pub mod modifiers;
pub mod state;
pub mod tool;

pub use events::{CursorStyle, Key, MouseButton, PointerDisposition};
pub use modifiers::Modifiers;
pub use state::{DrawingState, InputSettings, InputState, TextSession};
pub use tool::Tool;
