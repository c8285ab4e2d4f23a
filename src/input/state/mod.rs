mod core;
mod keys;
mod mouse;
mod text;
#[cfg(test)]
mod tests;

pub use core::{DrawingState, InputSettings, InputState};
pub use text::TextSession;
