//! Drawing state machine and input state management.

use super::text::TextSession;
use crate::config::{Command, Config, KeyBinding};
use crate::draw::{
    Action, Color, DragOverride, Draft, FontDescriptor, History, Scene, StrokeKind, TextId,
    TextMap,
};
use crate::input::{
    events::{CursorStyle, PointerDisposition},
    modifiers::Modifiers,
    tool::Tool,
};
use crate::util::{Point, Rect};
use std::collections::HashMap;

/// Pointer interaction state.
///
/// Each variant that builds something owns its draft, so at most one draft
/// exists at any time.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawingState {
    /// Waiting for pointer input
    Idle,
    /// Pen or eraser drag in progress
    DrawingStroke {
        kind: StrokeKind,
        color: Color,
        width: f64,
        points: Vec<Point>,
    },
    /// Box drag in progress; the rectangle spans `anchor` and `current`
    DraggingRect {
        anchor: Point,
        current: Point,
        color: Color,
        width: f64,
    },
    /// An existing text block is being moved
    DraggingText {
        id: TextId,
        /// Anchor of the block when the drag started
        origin: Point,
        /// Pointer position minus block anchor at grab time
        grab_offset: (f64, f64),
        /// Live anchor of the block
        position: Point,
    },
}

/// Tool defaults applied to new actions.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSettings {
    pub color: Color,
    /// Nominal width for pen and erase strokes
    pub pen_width: f64,
    /// Outline width for boxes
    pub box_width: f64,
    /// Font size for newly created text blocks
    pub font_size: f64,
    /// Font used to measure and paint text
    pub font: FontDescriptor,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl InputSettings {
    pub fn from_config(config: &Config) -> Self {
        let drawing = &config.drawing;
        Self {
            color: drawing.default_color.to_color(),
            pen_width: drawing.pen_width,
            box_width: drawing.box_width,
            font_size: drawing.default_font_size,
            font: FontDescriptor::new(
                drawing.font_family.clone(),
                drawing.font_weight.clone(),
                drawing.font_style.clone(),
            ),
        }
    }
}

/// Main input state: history, active tool, draft and text session.
///
/// All transitions are synchronous. Pointer and tool handling only runs while
/// the overlay is visible and the tool dock is open.
pub struct InputState {
    /// Committed actions and the redo buffer
    pub(super) history: History,
    /// Defaults for new actions
    pub settings: InputSettings,
    pub(super) tool: Tool,
    pub(super) state: DrawingState,
    /// Open text editor, if any
    pub(super) text_session: Option<TextSession>,
    /// Next id handed to a newly committed text block; never decreases
    pub(super) next_text_id: TextId,
    /// Current modifier key state
    pub modifiers: Modifiers,
    pub(super) overlay_visible: bool,
    pub(super) dock_open: bool,
    /// Text block under the pointer while idle (cursor feedback only)
    pub(super) hover_text: Option<TextId>,
    /// Whether the last primary press started on a text block or moved
    pub(super) press: Option<PressInfo>,
    /// Whether the frame needs to be redrawn
    pub needs_redraw: bool,
    /// Keybinding command map
    command_map: HashMap<KeyBinding, Command>,
    /// Command the host must carry out (export, visibility persistence)
    pending_command: Option<Command>,
}

/// Bookkeeping for the current or last primary-button press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct PressInfo {
    pub origin: Point,
    pub on_text: bool,
    pub moved: bool,
}

impl InputState {
    /// Creates an input state with an empty history, no tool selected and
    /// the overlay visible with its dock open.
    pub fn new(settings: InputSettings, command_map: HashMap<KeyBinding, Command>) -> Self {
        Self {
            history: History::new(),
            settings,
            tool: Tool::None,
            state: DrawingState::Idle,
            text_session: None,
            next_text_id: 1,
            modifiers: Modifiers::new(),
            overlay_visible: true,
            dock_open: true,
            hover_text: None,
            press: None,
            needs_redraw: true,
            command_map,
            pending_command: None,
        }
    }

    // ------------------------------------------------------------------
    // Tools
    // ------------------------------------------------------------------

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    /// Activates `tool`, or deselects it when it is already active.
    ///
    /// Ignored unless input is enabled. Any draft is discarded and an open
    /// text session is committed. Returns the resulting tool.
    pub fn select_tool(&mut self, tool: Tool) -> Tool {
        if !self.input_enabled() {
            log::debug!("Ignoring tool selection while overlay input is disabled");
            return self.tool;
        }

        self.commit_text();
        self.discard_draft();
        self.tool = self.tool.toggled(tool);
        self.needs_redraw = true;
        log::debug!("Active tool: {:?}", self.tool);
        self.tool
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn actions(&self) -> &[Action] {
        self.history.actions()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undoes the most recent action. An open text session is committed
    /// first (so its text becomes the undone entry) and any draft is
    /// dropped.
    pub fn undo(&mut self) -> bool {
        self.reset_transient();
        let changed = self.history.undo();
        self.needs_redraw |= changed;
        changed
    }

    pub fn redo(&mut self) -> bool {
        self.reset_transient();
        let changed = self.history.redo();
        self.needs_redraw |= changed;
        changed
    }

    /// Discards every action and the redo buffer. Not itself undoable.
    pub fn clear(&mut self) {
        self.reset_transient();
        self.history.clear();
        self.needs_redraw = true;
        log::debug!("Cleared annotation history");
    }

    /// Appends a committed action and requests a redraw.
    pub(super) fn commit(&mut self, action: Action) {
        self.history.append(action);
        self.needs_redraw = true;
    }

    /// Returns a fresh text id. Ids are never reused, even after undo or clear.
    pub(super) fn allocate_text_id(&mut self) -> TextId {
        let id = self.next_text_id;
        self.next_text_id += 1;
        id
    }

    pub fn next_text_id(&self) -> TextId {
        self.next_text_id
    }

    fn reset_transient(&mut self) {
        if self.text_session.is_some() {
            log::debug!("Committing open text session before history change");
            self.commit_text();
        }
        self.discard_draft();
        self.hover_text = None;
    }

    /// Drops any in-progress draft without logging it.
    pub(super) fn discard_draft(&mut self) {
        if !matches!(self.state, DrawingState::Idle) {
            log::trace!("Discarding draft {:?}", self.state);
            self.state = DrawingState::Idle;
            self.needs_redraw = true;
        }
    }

    // ------------------------------------------------------------------
    // Derived state and rendering
    // ------------------------------------------------------------------

    /// Live position override for the text block being dragged.
    pub fn drag_override(&self) -> Option<DragOverride> {
        match &self.state {
            DrawingState::DraggingText { id, position, .. } => Some(DragOverride {
                id: *id,
                position: *position,
            }),
            _ => None,
        }
    }

    /// Current text blocks, including the live drag position.
    pub fn text_map(&self) -> TextMap {
        TextMap::fold(self.history.actions(), self.drag_override())
    }

    /// Id of the text block whose editor is open, if it already exists.
    pub fn editing_id(&self) -> Option<TextId> {
        self.text_session.as_ref().and_then(|session| session.id())
    }

    /// The draft built from the current pointer state.
    pub fn draft(&self) -> Option<Draft<'_>> {
        match &self.state {
            DrawingState::DrawingStroke {
                kind,
                color,
                width,
                points,
            } => Some(Draft::Stroke {
                kind: *kind,
                color: *color,
                width: *width,
                points,
            }),
            DrawingState::DraggingRect {
                anchor,
                current,
                color,
                width,
            } => Some(Draft::Rect {
                rect: Rect::from_corners(*anchor, *current),
                color: *color,
                width: *width,
            }),
            DrawingState::Idle | DrawingState::DraggingText { .. } => None,
        }
    }

    /// Everything the renderer needs for the next frame.
    pub fn scene(&self) -> Scene<'_> {
        Scene {
            actions: self.history.actions(),
            draft: self.draft(),
            text_drag: self.drag_override(),
            editing: self.editing_id(),
        }
    }

    // ------------------------------------------------------------------
    // Overlay gating
    // ------------------------------------------------------------------

    /// Pointer handling and tool activation require a visible overlay with
    /// the tool dock open.
    pub fn input_enabled(&self) -> bool {
        self.overlay_visible && self.dock_open
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn dock_open(&self) -> bool {
        self.dock_open
    }

    pub fn set_overlay_visible(&mut self, visible: bool) {
        if self.overlay_visible == visible {
            return;
        }
        self.overlay_visible = visible;
        if !visible {
            self.suspend_input();
        }
        self.needs_redraw = true;
        log::info!("Overlay {}", if visible { "shown" } else { "hidden" });
    }

    pub fn set_dock_open(&mut self, open: bool) {
        if self.dock_open == open {
            return;
        }
        self.dock_open = open;
        if !open {
            self.suspend_input();
        }
        self.needs_redraw = true;
        log::debug!("Tool dock {}", if open { "opened" } else { "closed" });
    }

    fn suspend_input(&mut self) {
        self.commit_text();
        self.discard_draft();
        self.hover_text = None;
        self.press = None;
    }

    /// Disposition for a pointer event handled in the current state.
    pub(super) fn disposition(&self) -> PointerDisposition {
        let active = self.tool != Tool::None || !matches!(self.state, DrawingState::Idle);
        if self.input_enabled() && active {
            PointerDisposition::Captured
        } else {
            PointerDisposition::Ignored
        }
    }

    /// Cursor the host should show over the overlay.
    pub fn cursor_style(&self) -> CursorStyle {
        if !self.input_enabled() {
            return CursorStyle::Default;
        }
        if matches!(self.state, DrawingState::DraggingText { .. }) {
            return CursorStyle::Grabbing;
        }
        if self.hover_text.is_some() && matches!(self.tool, Tool::None | Tool::Text) {
            return CursorStyle::Grab;
        }
        match self.tool {
            Tool::Pen | Tool::Erase | Tool::Box => CursorStyle::Crosshair,
            Tool::Text => CursorStyle::Text,
            Tool::None => CursorStyle::Default,
        }
    }

    // ------------------------------------------------------------------
    // Keyboard commands
    // ------------------------------------------------------------------

    /// Look up a command for the given key and current modifiers.
    pub(super) fn find_command(&self, key_str: &str) -> Option<Command> {
        self.command_map
            .iter()
            .find(|(binding, _)| {
                binding.matches(
                    key_str,
                    self.modifiers.ctrl,
                    self.modifiers.shift,
                    self.modifiers.alt,
                )
            })
            .map(|(_, command)| *command)
    }

    /// Takes the command the host must carry out, if any.
    pub fn take_pending_command(&mut self) -> Option<Command> {
        self.pending_command.take()
    }

    pub(super) fn set_pending_command(&mut self, command: Command) {
        self.pending_command = Some(command);
    }
}
