//! Text creation and edit-in-place sessions.

use crate::draw::{Action, Color, TextId, TextMetrics, measure_text};
use crate::util::Point;

use super::{DrawingState, InputState};

/// An open text editor.
///
/// While a session for an existing block is open that block is not painted;
/// the host draws its own input affordance sized by [`TextSession::metrics`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextSession {
    /// `None` for a block that does not exist yet
    id: Option<TextId>,
    anchor: Point,
    size: f64,
    color: Color,
    buffer: String,
    metrics: TextMetrics,
}

impl TextSession {
    pub fn id(&self) -> Option<TextId> {
        self.id
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Live dimensions of the current buffer.
    pub fn metrics(&self) -> TextMetrics {
        self.metrics
    }

    /// True when editing an existing block rather than creating one.
    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }
}

impl InputState {
    pub fn text_session(&self) -> Option<&TextSession> {
        self.text_session.as_ref()
    }

    /// Opens an empty session at `anchor` with the default size and color.
    pub(super) fn open_text_session(&mut self, anchor: Point) {
        self.commit_text();
        let mut session = TextSession {
            id: None,
            anchor,
            size: self.settings.font_size,
            color: self.settings.color,
            buffer: String::new(),
            metrics: TextMetrics::default(),
        };
        self.remeasure(&mut session);
        log::debug!("Opened text session at ({:.1}, {:.1})", anchor.x, anchor.y);
        self.text_session = Some(session);
        self.needs_redraw = true;
    }

    /// Opens a session pre-filled with the current state of block `id`.
    ///
    /// Returns `false` when no such block exists.
    pub(super) fn open_edit_session(&mut self, id: TextId) -> bool {
        self.commit_text();
        let Some(block) = self.text_map().get(id).cloned() else {
            return false;
        };

        let session = TextSession {
            id: Some(block.id),
            anchor: block.position(),
            size: block.size,
            color: block.color,
            metrics: TextMetrics {
                width: block.width,
                height: block.height,
            },
            buffer: block.value,
        };
        log::debug!("Editing text block {}", id);
        self.text_session = Some(session);
        self.needs_redraw = true;
        true
    }

    /// Appends `ch` to the open session.
    pub fn insert_char(&mut self, ch: char) {
        self.edit_buffer(|buffer| buffer.push(ch));
    }

    /// Removes the last character of the open session.
    pub fn backspace(&mut self) {
        self.edit_buffer(|buffer| {
            buffer.pop();
        });
    }

    /// Replaces the whole buffer of the open session (hosts with their own
    /// text widget forward its value here).
    pub fn set_text(&mut self, value: &str) {
        self.edit_buffer(|buffer| {
            buffer.clear();
            buffer.push_str(value);
        });
    }

    fn edit_buffer(&mut self, edit: impl FnOnce(&mut String)) {
        let Some(mut session) = self.text_session.take() else {
            return;
        };
        edit(&mut session.buffer);
        self.remeasure(&mut session);
        self.text_session = Some(session);
        self.needs_redraw = true;
    }

    fn remeasure(&self, session: &mut TextSession) {
        session.metrics = measure_text(&session.buffer, session.size, &self.settings.font);
    }

    /// Finishes the open session.
    ///
    /// Empty or whitespace-only content appends nothing. Otherwise a new
    /// `TextAdd` is appended, carrying the session's id (or a fresh one for a
    /// new block). Calling this with no open session is a no-op, so the
    /// explicit finish and a later focus loss commit at most once.
    pub fn commit_text(&mut self) -> Option<TextId> {
        let session = self.text_session.take()?;
        self.needs_redraw = true;

        if session.buffer.trim().is_empty() {
            log::trace!("Discarding empty text session");
            return None;
        }

        let id = match session.id {
            Some(id) => id,
            None => self.allocate_text_id(),
        };
        let metrics = measure_text(&session.buffer, session.size, &self.settings.font);

        self.commit(Action::TextAdd {
            id,
            value: session.buffer,
            x: session.anchor.x,
            y: session.anchor.y,
            size: session.size,
            color: session.color,
            measured_width: metrics.width,
            measured_height: metrics.height,
        });
        Some(id)
    }

    /// Host notification that the editor lost focus: commits.
    pub fn text_focus_lost(&mut self) -> Option<TextId> {
        self.commit_text()
    }

    /// Discards the open session without appending anything.
    pub fn cancel_text(&mut self) {
        if self.text_session.take().is_some() {
            log::debug!("Cancelled text session");
            self.needs_redraw = true;
        }
    }

    /// True while the pointer state allows a text session to be opened.
    pub(super) fn can_open_text(&self) -> bool {
        self.input_enabled() && matches!(self.state, DrawingState::Idle)
    }
}
