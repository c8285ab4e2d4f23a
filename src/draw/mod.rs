//! Action log, derived text state and Cairo rendering.
//!
//! This module defines the core annotation model:
//! - [`Action`]: the immutable, loggable units of drawing history
//! - [`History`]: the committed log with linear undo/redo
//! - [`TextMap`]: text blocks reconstructed by folding the log
//! - [`render_scene`]: the full-replay renderer and its [`Canvas`] target

pub mod action;
pub mod canvas;
pub mod color;
pub mod font;
pub mod history;
pub mod raster;
pub mod render;
pub mod text_map;

pub use action::{Action, StrokeKind, TextId};
pub use canvas::Canvas;
pub use color::Color;
pub use font::{FontDescriptor, TextMetrics, line_height, measure_text};
pub use history::History;
pub use raster::{RasterError, RasterImage};
pub use render::{Draft, Scene, render_scene};
pub use text_map::{DragOverride, TextBlock, TextMap};

pub use color::{BLACK, BLUE, GREEN, ORANGE, PINK, RED, TRANSPARENT, WHITE, YELLOW};
