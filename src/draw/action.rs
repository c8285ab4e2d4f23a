//! Loggable annotation actions.

use super::color::Color;
use crate::util::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Stable identity of a text block across edits and moves.
pub type TextId = u64;

/// How a stroke composites onto the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeKind {
    /// Paints color over existing content.
    Pen,
    /// Removes existing content along the path.
    Erase,
}

/// One immutable, loggable unit of annotation history.
///
/// Once appended to the [`History`](super::History) an action is never edited;
/// edits and moves of text blocks are new actions that the text fold in
/// [`TextMap`](super::TextMap) interprets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// One continuous pointer drag.
    Stroke {
        kind: StrokeKind,
        color: Color,
        /// Nominal line width in logical pixels
        width: f64,
        /// Points traced by the pointer (at least two once committed)
        points: Vec<Point>,
    },
    /// Axis-aligned box outline; `(x, y)` is always the top-left corner.
    RectOutline {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: Color,
        width: f64,
    },
    /// Creation or replacement of a text block's content.
    TextAdd {
        id: TextId,
        value: String,
        x: f64,
        y: f64,
        size: f64,
        color: Color,
        measured_width: f64,
        measured_height: f64,
    },
    /// Relocation of an existing text block's anchor.
    TextMove { id: TextId, from: Point, to: Point },
}

impl Action {
    /// Builds a stroke action, or `None` when the path is a tap (fewer than
    /// two points).
    pub fn stroke(kind: StrokeKind, color: Color, width: f64, points: Vec<Point>) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        Some(Action::Stroke {
            kind,
            color,
            width,
            points,
        })
    }

    /// Builds a normalized rectangle outline spanning two drag corners, or
    /// `None` when the drag has no area.
    pub fn rect_outline(anchor: Point, corner: Point, color: Color, width: f64) -> Option<Self> {
        let rect = Rect::from_corners(anchor, corner);
        if rect.is_degenerate() {
            return None;
        }
        Some(Action::RectOutline {
            x: rect.x,
            y: rect.y,
            w: rect.width,
            h: rect.height,
            color,
            width,
        })
    }

    /// Returns the text block id this action refers to, if any.
    pub fn text_id(&self) -> Option<TextId> {
        match self {
            Action::TextAdd { id, .. } | Action::TextMove { id, .. } => Some(*id),
            Action::Stroke { .. } | Action::RectOutline { .. } => None,
        }
    }

    /// Short label for log output.
    pub fn label(&self) -> &'static str {
        match self {
            Action::Stroke {
                kind: StrokeKind::Pen,
                ..
            } => "pen stroke",
            Action::Stroke {
                kind: StrokeKind::Erase,
                ..
            } => "erase stroke",
            Action::RectOutline { .. } => "rectangle",
            Action::TextAdd { .. } => "text",
            Action::TextMove { .. } => "text move",
        }
    }
}
