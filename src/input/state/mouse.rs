use crate::draw::Action;
use crate::input::{events::MouseButton, events::PointerDisposition, tool::Tool};
use crate::util::Point;

use super::core::PressInfo;
use super::{DrawingState, InputState};

impl InputState {
    /// Processes a pointer button press.
    ///
    /// With the primary button, in order:
    /// 1. a text block under the pointer (topmost first) starts a text drag,
    ///    whatever the active tool;
    /// 2. the `Text` tool does nothing here (placement happens on click);
    /// 3. the `Box` tool starts a zero-size rectangle draft;
    /// 4. `Pen`/`Erase` start a one-point stroke draft.
    ///
    /// The secondary button discards the current draft. An open text session
    /// loses focus and is committed before anything else happens.
    pub fn on_pointer_down(&mut self, button: MouseButton, point: Point) -> PointerDisposition {
        if !self.input_enabled() {
            return PointerDisposition::Ignored;
        }

        match button {
            MouseButton::Left => {}
            MouseButton::Right => {
                self.discard_draft();
                return self.disposition();
            }
            MouseButton::Middle => return PointerDisposition::Ignored,
        }

        if !matches!(self.state, DrawingState::Idle) {
            return self.disposition();
        }

        self.commit_text();

        let hit = self
            .text_map()
            .hit_test(point)
            .map(|block| (block.id, block.position()));
        self.press = Some(PressInfo {
            origin: point,
            on_text: hit.is_some(),
            moved: false,
        });

        if let Some((id, position)) = hit {
            log::debug!("Grabbed text block {}", id);
            self.state = DrawingState::DraggingText {
                id,
                origin: position,
                grab_offset: point.offset_from(position),
                position,
            };
            self.hover_text = Some(id);
            self.needs_redraw = true;
            return self.disposition();
        }

        match self.tool {
            Tool::Box => {
                self.state = DrawingState::DraggingRect {
                    anchor: point,
                    current: point,
                    color: self.settings.color,
                    width: self.settings.box_width,
                };
                self.needs_redraw = true;
            }
            Tool::Pen | Tool::Erase => {
                if let Some(kind) = self.tool.stroke_kind() {
                    self.state = DrawingState::DrawingStroke {
                        kind,
                        color: self.settings.color,
                        width: self.settings.pen_width,
                        points: vec![point],
                    };
                    self.needs_redraw = true;
                }
            }
            Tool::Text | Tool::None => {}
        }

        self.disposition()
    }

    /// Processes pointer motion.
    ///
    /// Extends the active draft. With no draft and tool `None`/`Text` it only
    /// updates hover feedback for the cursor.
    pub fn on_pointer_move(&mut self, point: Point) -> PointerDisposition {
        if !self.input_enabled() {
            return PointerDisposition::Ignored;
        }

        if let Some(press) = self.press.as_mut()
            && point != press.origin
        {
            press.moved = true;
        }

        if matches!(self.state, DrawingState::Idle) {
            if matches!(self.tool, Tool::None | Tool::Text) {
                let hovered = self.text_map().hit_test(point).map(|block| block.id);
                if hovered != self.hover_text {
                    self.hover_text = hovered;
                    self.needs_redraw = true;
                }
            }
            return self.disposition();
        }

        match &mut self.state {
            DrawingState::Idle => {}
            DrawingState::DrawingStroke { points, .. } => {
                points.push(point);
                self.needs_redraw = true;
            }
            DrawingState::DraggingRect { current, .. } => {
                *current = point;
                self.needs_redraw = true;
            }
            DrawingState::DraggingText {
                grab_offset,
                position,
                ..
            } => {
                *position = point.translated(-grab_offset.0, -grab_offset.1);
                self.needs_redraw = true;
            }
        }

        self.disposition()
    }

    /// Processes a pointer button release and finalizes the draft.
    ///
    /// - text drag: appends `TextMove` only for a nonzero displacement;
    /// - rectangle: appends `RectOutline` only with positive width and height;
    /// - stroke: appends `Stroke` only with more than one point.
    ///
    /// Anything else is discarded silently. The state always returns to idle.
    pub fn on_pointer_up(&mut self, button: MouseButton, point: Point) -> PointerDisposition {
        if !self.input_enabled() || button != MouseButton::Left {
            return PointerDisposition::Ignored;
        }

        if !matches!(self.state, DrawingState::Idle) {
            self.on_pointer_move(point);
        }
        let disposition = self.disposition();
        self.finalize_draft();
        disposition
    }

    /// The pointer left the overlay: finishes any drag as if released at
    /// the last known position and clears hover feedback.
    pub fn on_pointer_leave(&mut self) -> PointerDisposition {
        if !self.input_enabled() {
            return PointerDisposition::Ignored;
        }
        let disposition = self.disposition();
        self.finalize_draft();
        self.press = None;
        if self.hover_text.take().is_some() {
            self.needs_redraw = true;
        }
        disposition
    }

    fn finalize_draft(&mut self) {
        let state = std::mem::replace(&mut self.state, DrawingState::Idle);

        let action = match state {
            DrawingState::Idle => return,
            DrawingState::DraggingText {
                id,
                origin,
                position,
                ..
            } => (position != origin).then_some(Action::TextMove {
                id,
                from: origin,
                to: position,
            }),
            DrawingState::DraggingRect {
                anchor,
                current,
                color,
                width,
            } => Action::rect_outline(anchor, current, color, width),
            DrawingState::DrawingStroke {
                kind,
                color,
                width,
                mut points,
            } => {
                points.dedup();
                Action::stroke(kind, color, width, points)
            }
        };

        match action {
            Some(action) => self.commit(action),
            None => {
                log::trace!("Discarded degenerate draft");
                self.needs_redraw = true;
            }
        }
    }

    /// A plain click (press and release without a drag).
    ///
    /// With the `Text` tool this opens an empty text session at `point`,
    /// unless the click landed on an existing text block.
    pub fn on_click(&mut self, point: Point) -> PointerDisposition {
        if !self.input_enabled() {
            return PointerDisposition::Ignored;
        }

        let press = self.press.take();
        let dragged = press.is_some_and(|press| press.moved || press.on_text);
        if self.tool != Tool::Text || dragged || !self.can_open_text() {
            return self.disposition();
        }
        if self.text_map().hit_test(point).is_some() {
            return self.disposition();
        }

        self.open_text_session(point);
        PointerDisposition::Captured
    }

    /// Double activation: opens the topmost text block under `point` for
    /// editing, whatever the active tool.
    pub fn on_double_click(&mut self, point: Point) -> PointerDisposition {
        if !self.input_enabled() || !self.can_open_text() {
            return PointerDisposition::Ignored;
        }

        let Some(id) = self.text_map().hit_test(point).map(|block| block.id) else {
            return self.disposition();
        };

        self.press = None;
        if self.open_edit_session(id) {
            PointerDisposition::Captured
        } else {
            self.disposition()
        }
    }
}
