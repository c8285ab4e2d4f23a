//! Annotation overlay engine.
//!
//! Draw pen and eraser strokes, box outlines and text labels on top of any
//! surface, undo and redo them, and export the view underneath with the
//! annotations flattened in.
//!
//! The drawing log in [`draw`] is the only source of truth: every frame is a
//! full replay of it. [`input`] turns pointer and keyboard events into log
//! entries, [`capture`] composites exports and [`overlay::Overlay`] ties
//! them together for a host.

pub mod capture;
pub mod config;
pub mod draw;
pub mod input;
pub mod notification;
pub mod overlay;
pub mod replay;
pub mod store;
pub mod util;

pub use config::Config;
pub use overlay::Overlay;
