//! Cairo-based scene renderer.
//!
//! Every frame is a full replay of the committed log plus at most one draft,
//! so the displayed pixels are always a pure function of the current state.

use std::collections::HashMap;

use super::action::{Action, StrokeKind, TextId};
use super::color::Color;
use super::font::{FontDescriptor, line_height};
use super::text_map::{DragOverride, TextBlock, TextMap};
use crate::util::{Point, Rect};

/// Erase strokes are drawn this many times wider than their nominal width.
pub const ERASE_WIDTH_MULTIPLIER: f64 = 3.0;

/// An in-progress action built from live pointer input.
#[derive(Debug, Clone, Copy)]
pub enum Draft<'a> {
    Stroke {
        kind: StrokeKind,
        color: Color,
        width: f64,
        points: &'a [Point],
    },
    Rect {
        rect: Rect,
        color: Color,
        width: f64,
    },
}

/// Everything the renderer needs to produce one frame.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    /// Committed actions in chronological order
    pub actions: &'a [Action],
    /// Draft stroke or rectangle, drawn on top of everything else
    pub draft: Option<Draft<'a>>,
    /// Live position of a text block being dragged
    pub text_drag: Option<DragOverride>,
    /// Text block currently open in an editor (not painted)
    pub editing: Option<TextId>,
}

impl<'a> Scene<'a> {
    /// A scene showing only committed actions.
    pub fn committed(actions: &'a [Action]) -> Self {
        Self {
            actions,
            draft: None,
            text_drag: None,
            editing: None,
        }
    }
}

/// Renders a complete frame for `scene`, starting from a cleared surface.
///
/// Actions are replayed in log order so erase strokes remove whatever was
/// drawn before them. Each text block is painted once, at the log position of
/// its latest `TextAdd`, using the folded (current) content and position.
pub fn render_scene(ctx: &cairo::Context, scene: &Scene<'_>, font: &FontDescriptor) {
    clear(ctx);

    let texts = TextMap::fold(scene.actions, scene.text_drag);
    let latest_add = latest_text_adds(scene.actions);

    for (index, action) in scene.actions.iter().enumerate() {
        match action {
            Action::Stroke {
                kind,
                color,
                width,
                points,
            } => render_stroke(ctx, *kind, *color, *width, points),
            Action::RectOutline {
                x,
                y,
                w,
                h,
                color,
                width,
            } => render_rect_outline(ctx, Rect::new(*x, *y, *w, *h), *color, *width),
            Action::TextAdd { id, .. } => {
                if latest_add.get(id) != Some(&index) || scene.editing == Some(*id) {
                    continue;
                }
                if let Some(block) = texts.get(*id) {
                    render_text_block(ctx, block, font);
                }
            }
            Action::TextMove { .. } => {}
        }
    }

    if let Some(draft) = scene.draft {
        render_draft(ctx, draft);
    }
}

/// Renders a draft action with the same rules as its committed form.
pub fn render_draft(ctx: &cairo::Context, draft: Draft<'_>) {
    match draft {
        Draft::Stroke {
            kind,
            color,
            width,
            points,
        } => render_stroke(ctx, kind, color, width, points),
        Draft::Rect { rect, color, width } => render_rect_outline(ctx, rect, color, width),
    }
}

/// Clears the whole surface to fully transparent.
pub fn clear(ctx: &cairo::Context) {
    let _ = ctx.save();
    ctx.set_operator(cairo::Operator::Clear);
    let _ = ctx.paint(); // a failed paint leaves the previous frame; nothing to recover
    let _ = ctx.restore();
}

fn latest_text_adds(actions: &[Action]) -> HashMap<TextId, usize> {
    actions
        .iter()
        .enumerate()
        .filter_map(|(index, action)| match action {
            Action::TextAdd { id, .. } => Some((*id, index)),
            _ => None,
        })
        .collect()
}

/// Renders a polyline through `points` with round joins and caps.
///
/// Pen strokes paint with `Over`; erase strokes subtract alpha with `DestOut`
/// at [`ERASE_WIDTH_MULTIPLIER`] times the nominal width.
pub fn render_stroke(
    ctx: &cairo::Context,
    kind: StrokeKind,
    color: Color,
    width: f64,
    points: &[Point],
) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };

    let _ = ctx.save();
    match kind {
        StrokeKind::Pen => {
            ctx.set_operator(cairo::Operator::Over);
            color.apply(ctx);
            ctx.set_line_width(width);
        }
        StrokeKind::Erase => {
            // Only the source alpha matters for DestOut.
            ctx.set_operator(cairo::Operator::DestOut);
            ctx.set_source_rgba(0.0, 0.0, 0.0, 1.0);
            ctx.set_line_width(width * ERASE_WIDTH_MULTIPLIER);
        }
    }
    ctx.set_line_cap(cairo::LineCap::Round);
    ctx.set_line_join(cairo::LineJoin::Round);

    ctx.move_to(first.x, first.y);
    if rest.is_empty() {
        // Zero-length segment so the round cap shows a dot under a fresh draft.
        ctx.line_to(first.x, first.y);
    }
    for point in rest {
        ctx.line_to(point.x, point.y);
    }

    let _ = ctx.stroke();
    let _ = ctx.restore();
}

/// Strokes an axis-aligned rectangle outline (no fill).
pub fn render_rect_outline(ctx: &cairo::Context, rect: Rect, color: Color, width: f64) {
    let _ = ctx.save();
    ctx.set_operator(cairo::Operator::Over);
    color.apply(ctx);
    ctx.set_line_width(width);
    ctx.set_line_join(cairo::LineJoin::Miter);
    ctx.rectangle(rect.x, rect.y, rect.width, rect.height);
    let _ = ctx.stroke();
    let _ = ctx.restore();
}

/// Paints each line of a text block, top-aligned at its anchor, one
/// [`line_height`] apart.
pub fn render_text_block(ctx: &cairo::Context, block: &TextBlock, font: &FontDescriptor) {
    let _ = ctx.save();

    // Grayscale AA: subpixel fringes show up on transparent overlays.
    ctx.set_antialias(cairo::Antialias::Gray);
    ctx.set_operator(cairo::Operator::Over);
    block.color.apply(ctx);

    let layout = font.layout(ctx, block.size);
    let step = line_height(block.size);

    for (row, line) in block.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        layout.set_text(line);
        ctx.move_to(block.x, block.y + step * row as f64);
        pangocairo::functions::show_layout(ctx, &layout);
    }

    let _ = ctx.restore();
}
