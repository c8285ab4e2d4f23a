use super::*;
use crate::config::{Command, KeybindingsConfig};
use crate::draw::{Action, StrokeKind, TextId, color::BLUE, color::RED};
use crate::input::{CursorStyle, Key, MouseButton, PointerDisposition, Tool};
use crate::util::Point;

fn create_test_input_state() -> InputState {
    let command_map = KeybindingsConfig::default().build_command_map().unwrap();
    InputState::new(InputSettings::default(), command_map)
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Presses at the first point, moves through the middle ones and releases
/// at the last.
fn drag(state: &mut InputState, path: &[(f64, f64)]) {
    let (first, rest) = path.split_first().unwrap();
    state.on_pointer_down(MouseButton::Left, (*first).into());
    for point in rest {
        state.on_pointer_move((*point).into());
    }
    let last = rest.last().unwrap_or(first);
    state.on_pointer_up(MouseButton::Left, (*last).into());
}

fn click(state: &mut InputState, x: f64, y: f64) {
    state.on_pointer_down(MouseButton::Left, pt(x, y));
    state.on_pointer_up(MouseButton::Left, pt(x, y));
    state.on_click(pt(x, y));
}

fn type_text(state: &mut InputState, text: &str) {
    for ch in text.chars() {
        let key = match ch {
            ' ' => Key::Space,
            c => Key::Char(c),
        };
        state.on_key_press(key);
    }
}

fn seed_text(state: &mut InputState, id: TextId, value: &str, x: f64, y: f64) {
    state.commit(Action::TextAdd {
        id,
        value: value.to_string(),
        x,
        y,
        size: 20.0,
        color: RED,
        measured_width: 50.0,
        measured_height: 26.0,
    });
}

// ----------------------------------------------------------------------------
// Strokes and rectangles
// ----------------------------------------------------------------------------

#[test]
fn test_pen_drag_commits_single_stroke() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Pen);

    drag(&mut state, &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);

    assert_eq!(state.actions().len(), 1);
    match &state.actions()[0] {
        Action::Stroke { kind, points, .. } => {
            assert_eq!(*kind, StrokeKind::Pen);
            assert_eq!(points, &vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0)]);
        }
        other => panic!("expected stroke, got {other:?}"),
    }
    assert_eq!(state.state(), &DrawingState::Idle);
}

#[test]
fn test_pen_down_up_appends_nothing() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Pen);

    drag(&mut state, &[(4.0, 4.0)]);
    assert!(state.actions().is_empty());

    // Jitter onto the same point is still a tap
    drag(&mut state, &[(4.0, 4.0), (4.0, 4.0)]);
    assert!(state.actions().is_empty());
    assert_eq!(state.state(), &DrawingState::Idle);
}

#[test]
fn test_erase_tool_commits_erase_stroke() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Erase);
    drag(&mut state, &[(0.0, 0.0), (5.0, 5.0)]);

    assert!(matches!(
        state.actions(),
        [Action::Stroke {
            kind: StrokeKind::Erase,
            ..
        }]
    ));
}

#[test]
fn test_box_drag_commits_normalized_rect() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Box);

    drag(&mut state, &[(5.0, 5.0), (25.0, 15.0)]);
    drag(&mut state, &[(25.0, 15.0), (5.0, 5.0)]);

    let expected = Action::RectOutline {
        x: 5.0,
        y: 5.0,
        w: 20.0,
        h: 10.0,
        color: state.settings.color,
        width: state.settings.box_width,
    };
    assert_eq!(state.actions(), &[expected.clone(), expected]);
}

#[test]
fn test_degenerate_box_drags_append_nothing() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Box);

    drag(&mut state, &[(5.0, 5.0)]);
    drag(&mut state, &[(5.0, 5.0), (40.0, 5.0)]);
    drag(&mut state, &[(5.0, 5.0), (5.0, 40.0)]);

    assert!(state.actions().is_empty());
}

#[test]
fn test_draft_is_visible_in_scene_until_release() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Box);

    state.on_pointer_down(MouseButton::Left, pt(1.0, 1.0));
    state.on_pointer_move(pt(9.0, 6.0));
    assert!(state.scene().draft.is_some());
    assert!(state.actions().is_empty());

    state.on_pointer_up(MouseButton::Left, pt(9.0, 6.0));
    assert!(state.scene().draft.is_none());
    assert_eq!(state.actions().len(), 1);
}

#[test]
fn test_right_button_discards_draft() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Pen);

    state.on_pointer_down(MouseButton::Left, pt(0.0, 0.0));
    state.on_pointer_move(pt(20.0, 0.0));
    state.on_pointer_down(MouseButton::Right, pt(20.0, 0.0));
    state.on_pointer_up(MouseButton::Left, pt(30.0, 0.0));

    assert!(state.actions().is_empty());
}

#[test]
fn test_pointer_leave_finishes_drag() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Pen);

    state.on_pointer_down(MouseButton::Left, pt(0.0, 0.0));
    state.on_pointer_move(pt(8.0, 8.0));
    state.on_pointer_leave();

    assert_eq!(state.actions().len(), 1);
    assert_eq!(state.state(), &DrawingState::Idle);
}

#[test]
fn test_tool_none_draws_nothing() {
    let mut state = create_test_input_state();
    let disposition = state.on_pointer_down(MouseButton::Left, pt(0.0, 0.0));
    state.on_pointer_move(pt(10.0, 10.0));
    state.on_pointer_up(MouseButton::Left, pt(10.0, 10.0));

    assert_eq!(disposition, PointerDisposition::Ignored);
    assert!(state.actions().is_empty());
}

// ----------------------------------------------------------------------------
// History through the state machine
// ----------------------------------------------------------------------------

#[test]
fn test_undo_redo_through_state_machine() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Pen);
    drag(&mut state, &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
    let committed = state.actions().to_vec();

    assert!(state.undo());
    assert!(state.actions().is_empty());
    assert!(state.can_redo());

    assert!(state.redo());
    assert_eq!(state.actions(), committed.as_slice());
    assert!(!state.can_redo());
}

#[test]
fn test_new_commit_after_undo_clears_redo() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Pen);
    drag(&mut state, &[(0.0, 0.0), (10.0, 0.0)]);
    drag(&mut state, &[(0.0, 5.0), (10.0, 5.0)]);

    state.undo();
    assert!(state.can_redo());

    drag(&mut state, &[(0.0, 9.0), (10.0, 9.0)]);
    assert!(!state.can_redo());
    assert_eq!(state.actions().len(), 2);
}

#[test]
fn test_undo_discards_in_progress_draft() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Pen);
    drag(&mut state, &[(0.0, 0.0), (10.0, 0.0)]);

    state.on_pointer_down(MouseButton::Left, pt(0.0, 3.0));
    state.on_pointer_move(pt(4.0, 3.0));
    state.undo();

    assert_eq!(state.state(), &DrawingState::Idle);
    state.on_pointer_up(MouseButton::Left, pt(9.0, 3.0));
    assert!(state.actions().is_empty());
}

#[test]
fn test_clear_empties_both_sequences() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Pen);
    drag(&mut state, &[(0.0, 0.0), (10.0, 0.0)]);
    drag(&mut state, &[(0.0, 5.0), (10.0, 5.0)]);
    state.undo();

    state.clear();
    assert!(!state.can_undo());
    assert!(!state.can_redo());
}

// ----------------------------------------------------------------------------
// Text
// ----------------------------------------------------------------------------

#[test]
fn test_create_then_edit_text_keeps_single_block() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Text);

    click(&mut state, 0.0, 0.0);
    assert!(state.text_session().is_some());
    type_text(&mut state, "hello");
    state.on_key_press(Key::Return);

    assert_eq!(state.actions().len(), 1);
    let id = state.actions()[0].text_id().unwrap();

    state.on_double_click(pt(2.0, 2.0));
    let session = state.text_session().unwrap();
    assert_eq!(session.id(), Some(id));
    assert_eq!(session.text(), "hello");
    assert_eq!(state.scene().editing, Some(id));

    state.set_text("hello world");
    state.on_key_press(Key::Return);

    assert_eq!(state.actions().len(), 2);
    let map = state.text_map();
    assert_eq!(map.len(), 1);
    let block = map.get(id).unwrap();
    assert_eq!(block.value, "hello world");
    assert_eq!(block.position(), pt(0.0, 0.0));
}

#[test]
fn test_commit_happens_once_per_session() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Text);
    click(&mut state, 10.0, 10.0);
    type_text(&mut state, "once");

    assert!(state.commit_text().is_some());
    assert!(state.text_focus_lost().is_none());
    assert_eq!(state.actions().len(), 1);
}

#[test]
fn test_whitespace_text_appends_nothing() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Text);
    click(&mut state, 10.0, 10.0);
    type_text(&mut state, "   ");
    state.on_key_press(Key::Return);

    assert!(state.text_session().is_none());
    assert!(state.actions().is_empty());
}

#[test]
fn test_clearing_edited_text_does_not_remove_block() {
    let mut state = create_test_input_state();
    seed_text(&mut state, 1, "keep", 0.0, 0.0);

    state.on_double_click(pt(5.0, 5.0));
    state.set_text("");
    state.text_focus_lost();

    assert_eq!(state.actions().len(), 1);
    assert_eq!(state.text_map().get(1).unwrap().value, "keep");
}

#[test]
fn test_cancel_discards_edits() {
    let mut state = create_test_input_state();
    seed_text(&mut state, 1, "original", 0.0, 0.0);

    state.on_double_click(pt(5.0, 5.0));
    state.set_text("changed");
    state.on_key_press(Key::Escape);

    assert!(state.text_session().is_none());
    assert_eq!(state.actions().len(), 1);
    assert_eq!(state.scene().editing, None);
}

#[test]
fn test_edit_inherits_size_and_color() {
    let mut state = create_test_input_state();
    state.commit(Action::TextAdd {
        id: 4,
        value: "styled".to_string(),
        x: 30.0,
        y: 40.0,
        size: 48.0,
        color: BLUE,
        measured_width: 120.0,
        measured_height: 62.0,
    });

    state.on_double_click(pt(35.0, 45.0));
    type_text(&mut state, "!");
    state.on_key_press(Key::Return);

    match state.actions().last().unwrap() {
        Action::TextAdd {
            id,
            value,
            x,
            y,
            size,
            color,
            ..
        } => {
            assert_eq!(*id, 4);
            assert_eq!(value, "styled!");
            assert_eq!((*x, *y), (30.0, 40.0));
            assert_eq!(*size, 48.0);
            assert_eq!(*color, BLUE);
        }
        other => panic!("expected text add, got {other:?}"),
    }
}

#[test]
fn test_shift_return_inserts_newline() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Text);
    click(&mut state, 0.0, 0.0);
    type_text(&mut state, "a");
    state.on_key_press(Key::Shift);
    state.on_key_press(Key::Return);
    state.on_key_release(Key::Shift);
    type_text(&mut state, "b");
    state.on_key_press(Key::Backspace);
    type_text(&mut state, "c");

    assert_eq!(state.text_session().unwrap().text(), "a\nc");
}

#[test]
fn test_live_metrics_follow_buffer() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Text);
    click(&mut state, 0.0, 0.0);

    type_text(&mut state, "a");
    let narrow = state.text_session().unwrap().metrics();
    type_text(&mut state, "aaaaaaaa");
    let wide = state.text_session().unwrap().metrics();
    assert!(wide.width > narrow.width);

    state.on_key_press(Key::Shift);
    state.on_key_press(Key::Return);
    let tall = state.text_session().unwrap().metrics();
    assert!(tall.height > wide.height);

    // Not logged until commit
    assert!(state.actions().is_empty());
}

#[test]
fn test_text_ids_are_never_reused() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Text);

    click(&mut state, 0.0, 0.0);
    type_text(&mut state, "one");
    let first = state.commit_text().unwrap();

    state.undo();
    click(&mut state, 0.0, 0.0);
    type_text(&mut state, "two");
    let second = state.commit_text().unwrap();

    assert!(second > first);
}

#[test]
fn test_text_click_on_existing_block_does_not_create() {
    let mut state = create_test_input_state();
    seed_text(&mut state, 1, "label", 0.0, 0.0);
    state.select_tool(Tool::Text);

    click(&mut state, 10.0, 10.0);
    assert!(state.text_session().is_none());
}

#[test]
fn test_pointer_down_commits_open_session() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Text);
    click(&mut state, 0.0, 0.0);
    type_text(&mut state, "first");

    click(&mut state, 200.0, 200.0);
    assert_eq!(state.actions().len(), 1);
    let session = state.text_session().unwrap();
    assert_eq!(session.anchor(), pt(200.0, 200.0));
    assert!(!session.is_edit());
}

#[test]
fn test_typing_in_session_does_not_trigger_bindings() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Text);
    click(&mut state, 0.0, 0.0);

    type_text(&mut state, "pebd");
    assert_eq!(state.tool(), Tool::Text);
    assert_eq!(state.text_session().unwrap().text(), "pebd");
}

// ----------------------------------------------------------------------------
// Text dragging
// ----------------------------------------------------------------------------

#[test]
fn test_drag_text_appends_move_with_any_tool() {
    let mut state = create_test_input_state();
    seed_text(&mut state, 1, "drag me", 0.0, 0.0);
    state.select_tool(Tool::Pen);

    state.on_pointer_down(MouseButton::Left, pt(5.0, 5.0));
    state.on_pointer_move(pt(15.0, 25.0));
    assert_eq!(state.text_map().get(1).unwrap().position(), pt(10.0, 20.0));
    assert_eq!(state.cursor_style(), CursorStyle::Grabbing);
    state.on_pointer_up(MouseButton::Left, pt(15.0, 25.0));

    assert_eq!(
        state.actions().last(),
        Some(&Action::TextMove {
            id: 1,
            from: pt(0.0, 0.0),
            to: pt(10.0, 20.0),
        })
    );
    assert_eq!(state.text_map().get(1).unwrap().position(), pt(10.0, 20.0));
}

#[test]
fn test_text_drag_without_displacement_appends_nothing() {
    let mut state = create_test_input_state();
    seed_text(&mut state, 1, "still", 0.0, 0.0);

    drag(&mut state, &[(5.0, 5.0), (5.0, 5.0)]);
    assert_eq!(state.actions().len(), 1);
    assert_eq!(state.state(), &DrawingState::Idle);
}

#[test]
fn test_drag_picks_topmost_block() {
    let mut state = create_test_input_state();
    seed_text(&mut state, 1, "under", 0.0, 0.0);
    seed_text(&mut state, 2, "over", 20.0, 10.0);

    state.on_pointer_down(MouseButton::Left, pt(25.0, 15.0));
    assert!(matches!(
        state.state(),
        DrawingState::DraggingText { id: 2, .. }
    ));
}

#[test]
fn test_hover_updates_cursor() {
    let mut state = create_test_input_state();
    seed_text(&mut state, 1, "hover", 0.0, 0.0);

    state.on_pointer_move(pt(5.0, 5.0));
    assert_eq!(state.cursor_style(), CursorStyle::Grab);
    state.on_pointer_move(pt(500.0, 500.0));
    assert_eq!(state.cursor_style(), CursorStyle::Default);

    state.select_tool(Tool::Box);
    assert_eq!(state.cursor_style(), CursorStyle::Crosshair);
}

// ----------------------------------------------------------------------------
// Tools, gating and keyboard
// ----------------------------------------------------------------------------

#[test]
fn test_select_tool_toggles() {
    let mut state = create_test_input_state();
    assert_eq!(state.select_tool(Tool::Pen), Tool::Pen);
    assert_eq!(state.select_tool(Tool::Box), Tool::Box);
    assert_eq!(state.select_tool(Tool::Box), Tool::None);
}

#[test]
fn test_hidden_overlay_ignores_pointer_and_tools() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Pen);
    state.set_overlay_visible(false);

    let disposition = state.on_pointer_down(MouseButton::Left, pt(0.0, 0.0));
    state.on_pointer_move(pt(10.0, 0.0));
    state.on_pointer_up(MouseButton::Left, pt(10.0, 0.0));

    assert_eq!(disposition, PointerDisposition::Ignored);
    assert!(state.actions().is_empty());
    assert_eq!(state.select_tool(Tool::Box), Tool::Pen);
}

#[test]
fn test_closed_dock_ignores_pointer() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Pen);
    state.set_dock_open(false);

    drag(&mut state, &[(0.0, 0.0), (10.0, 0.0)]);
    assert!(state.actions().is_empty());

    state.set_dock_open(true);
    assert!(
        state
            .on_pointer_down(MouseButton::Left, pt(0.0, 0.0))
            .is_captured()
    );
}

#[test]
fn test_hiding_overlay_commits_text_and_drops_draft() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Text);
    click(&mut state, 0.0, 0.0);
    type_text(&mut state, "note");

    state.set_overlay_visible(false);
    assert!(state.text_session().is_none());
    assert_eq!(state.actions().len(), 1);
}

#[test]
fn test_keybindings_dispatch_commands() {
    let mut state = create_test_input_state();

    state.on_key_press(Key::Char('p'));
    assert_eq!(state.tool(), Tool::Pen);
    drag(&mut state, &[(0.0, 0.0), (10.0, 0.0)]);

    state.on_key_press(Key::Ctrl);
    state.on_key_press(Key::Char('z'));
    assert!(state.actions().is_empty());

    state.on_key_press(Key::Char('y'));
    assert_eq!(state.actions().len(), 1);
    state.on_key_release(Key::Ctrl);

    state.on_key_press(Key::Escape);
    assert_eq!(state.tool(), Tool::None);
}

#[test]
fn test_history_bindings_are_swallowed_inside_text_session() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Pen);
    drag(&mut state, &[(0.0, 0.0), (10.0, 0.0)]);
    state.select_tool(Tool::Text);
    click(&mut state, 50.0, 50.0);
    type_text(&mut state, "hello");

    state.on_key_press(Key::Ctrl);
    state.on_key_press(Key::Char('z'));
    state.on_key_press(Key::Shift);
    state.on_key_press(Key::Char('X'));
    state.on_key_release(Key::Shift);
    state.on_key_release(Key::Ctrl);

    assert_eq!(state.actions().len(), 1);
    assert!(!state.can_redo());
    assert_eq!(state.text_session().unwrap().text(), "hello");

    state.on_key_press(Key::Return);
    assert!(matches!(
        state.actions(),
        [Action::Stroke { .. }, Action::TextAdd { value, .. }] if value == "hello"
    ));
}

#[test]
fn test_other_ctrl_bindings_work_inside_text_session() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Text);
    click(&mut state, 50.0, 50.0);
    type_text(&mut state, "hi");

    state.on_key_press(Key::Ctrl);
    state.on_key_press(Key::Char('s'));

    assert_eq!(state.take_pending_command(), Some(Command::SaveExport));
    assert_eq!(state.text_session().unwrap().text(), "hi");
}

#[test]
fn test_unbound_chords_do_not_type() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Text);
    click(&mut state, 50.0, 50.0);
    type_text(&mut state, "ab");

    state.on_key_press(Key::Ctrl);
    state.on_key_press(Key::Char('a'));
    state.on_key_release(Key::Ctrl);
    state.on_key_press(Key::Alt);
    state.on_key_press(Key::Char('q'));
    state.on_key_release(Key::Alt);

    assert_eq!(state.text_session().unwrap().text(), "ab");
}

#[test]
fn test_undo_commits_open_session_before_undoing() {
    let mut state = create_test_input_state();
    state.select_tool(Tool::Pen);
    drag(&mut state, &[(0.0, 0.0), (10.0, 0.0)]);
    state.select_tool(Tool::Text);
    click(&mut state, 50.0, 50.0);
    type_text(&mut state, "hello");

    assert!(state.undo());
    assert!(state.text_session().is_none());
    assert!(matches!(state.actions(), [Action::Stroke { .. }]));

    assert!(state.redo());
    assert!(matches!(
        state.actions(),
        [Action::Stroke { .. }, Action::TextAdd { value, .. }] if value == "hello"
    ));
}

#[test]
fn test_export_commands_are_queued_for_host() {
    let mut state = create_test_input_state();

    state.on_key_press(Key::Ctrl);
    state.on_key_press(Key::Char('s'));
    assert_eq!(state.take_pending_command(), Some(Command::SaveExport));
    assert_eq!(state.take_pending_command(), None);

    state.on_key_press(Key::Shift);
    state.on_key_press(Key::Char('C'));
    assert_eq!(state.take_pending_command(), Some(Command::CopyExport));
}

#[test]
fn test_toggle_dock_binding() {
    let mut state = create_test_input_state();
    state.on_key_press(Key::Char('d'));
    assert!(!state.dock_open());
    assert!(!state.input_enabled());
    state.on_key_press(Key::Char('d'));
    assert!(state.input_enabled());
}
