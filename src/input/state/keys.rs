use crate::config::Command;
use crate::input::{events::Key, tool::Tool};

use super::{DrawingState, InputState};

impl InputState {
    /// Processes a key press.
    ///
    /// While a text session is open, plain characters go to the session:
    /// Return finishes, Shift+Return breaks the line, Backspace deletes and
    /// Escape cancels. Keys held with Ctrl or Alt never reach the buffer;
    /// they go to the keybinding table, except undo, redo and clear, which
    /// the editor swallows. Outside a session every key is looked up in the
    /// table.
    pub fn on_key_press(&mut self, key: Key) {
        match key {
            Key::Shift => {
                self.modifiers.shift = true;
                return;
            }
            Key::Ctrl => {
                self.modifiers.ctrl = true;
                return;
            }
            Key::Alt => {
                self.modifiers.alt = true;
                return;
            }
            _ => {}
        }

        if self.text_session.is_some() {
            if self.modifiers.has_command_modifier() {
                // History bindings would reach past the open editor.
                match key.binding_name().and_then(|name| self.find_command(&name)) {
                    Some(Command::Undo | Command::Redo | Command::Clear) => {
                        log::debug!("History binding ignored while editing text");
                    }
                    Some(command) => self.handle_command(command),
                    None => {}
                }
                return;
            }

            match key {
                Key::Escape => self.cancel_text(),
                Key::Return if self.modifiers.shift => self.insert_char('\n'),
                Key::Return => {
                    self.commit_text();
                }
                Key::Backspace => self.backspace(),
                Key::Space => self.insert_char(' '),
                Key::Tab => self.insert_char('\t'),
                Key::Char(c) => self.insert_char(c),
                _ => {}
            }
            return;
        }

        if let Some(command) = key.binding_name().and_then(|name| self.find_command(&name)) {
            self.handle_command(command);
        }
    }

    /// Processes a key release (modifier tracking only).
    pub fn on_key_release(&mut self, key: Key) {
        match key {
            Key::Shift => self.modifiers.shift = false,
            Key::Ctrl => self.modifiers.ctrl = false,
            Key::Alt => self.modifiers.alt = false,
            _ => {}
        }
    }

    /// Executes a bound command.
    ///
    /// Export and visibility commands involve collaborators outside the
    /// input state; they are queued for the host (see
    /// [`InputState::take_pending_command`]).
    pub fn handle_command(&mut self, command: Command) {
        log::debug!("Command: {:?}", command);
        match command {
            Command::SelectPen => {
                self.select_tool(Tool::Pen);
            }
            Command::SelectErase => {
                self.select_tool(Tool::Erase);
            }
            Command::SelectText => {
                self.select_tool(Tool::Text);
            }
            Command::SelectBox => {
                self.select_tool(Tool::Box);
            }
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::Clear => self.clear(),
            Command::ToggleDock => self.set_dock_open(!self.dock_open),
            Command::ToggleOverlay | Command::CopyExport | Command::SaveExport => {
                self.set_pending_command(command)
            }
            Command::Cancel => self.cancel(),
        }
    }

    /// Escape semantics: drop the text session, else the draft, else the tool.
    fn cancel(&mut self) {
        if self.text_session.is_some() {
            self.cancel_text();
        } else if !matches!(self.state, DrawingState::Idle) {
            self.discard_draft();
        } else if self.tool != Tool::None {
            self.tool = Tool::None;
            self.needs_redraw = true;
        }
    }
}
