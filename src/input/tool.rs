//! Annotation tool selection.

use crate::draw::StrokeKind;
use serde::{Deserialize, Serialize};

/// The tool that interprets pointer drags on empty canvas.
///
/// Dragging an existing text block works regardless of the active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// No tool: pointer input only moves or edits existing text
    #[default]
    None,
    /// Freehand pen stroke
    Pen,
    /// Freehand eraser stroke (removes earlier content)
    Erase,
    /// Click to place a text block
    Text,
    /// Rectangle outline from corner to corner
    Box,
}

impl Tool {
    /// Stroke kind produced by dragging with this tool, if it draws strokes.
    pub fn stroke_kind(self) -> Option<StrokeKind> {
        match self {
            Tool::Pen => Some(StrokeKind::Pen),
            Tool::Erase => Some(StrokeKind::Erase),
            Tool::None | Tool::Text | Tool::Box => None,
        }
    }

    /// Result of activating `requested` while `self` is active: activating
    /// the current tool deselects it.
    pub fn toggled(self, requested: Tool) -> Tool {
        if self == requested {
            Tool::None
        } else {
            requested
        }
    }
}
