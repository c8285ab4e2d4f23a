//! Scripted input replay.
//!
//! A replay script is a JSON document listing host events in order:
//!
//! ```json
//! {
//!   "width": 320,
//!   "height": 200,
//!   "events": [
//!     { "type": "tool", "tool": "pen" },
//!     { "type": "drag", "points": [[10, 10], [60, 10], [60, 40]] },
//!     { "type": "click", "x": 20, "y": 80 },
//!     { "type": "key", "key": "T" },
//!     { "type": "click", "x": 20, "y": 80 },
//!     { "type": "text", "text": "hello" },
//!     { "type": "key", "key": "Return" }
//!   ]
//! }
//! ```
//!
//! Events go through the same [`InputState`] entry points a live host uses,
//! so a replay exercises the whole engine.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::config::KeyBinding;
use crate::input::{InputState, Key, MouseButton, Tool};
use crate::util::Point;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Logical overlay size; the CLI flags override these.
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    pub events: Vec<ScriptEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Activate a tool (activating the current tool deselects it).
    Tool { tool: Tool },
    Down {
        x: f64,
        y: f64,
        #[serde(default)]
        button: MouseButton,
    },
    Move { x: f64, y: f64 },
    Up {
        x: f64,
        y: f64,
        #[serde(default)]
        button: MouseButton,
    },
    Leave,
    /// Press, release and click at one point.
    Click { x: f64, y: f64 },
    DoubleClick { x: f64, y: f64 },
    /// Press at the first point, move through the rest, release at the last.
    Drag { points: Vec<[f64; 2]> },
    /// Key combination such as `"Ctrl+Z"`, `"Escape"` or `"T"`.
    Key { key: String },
    /// Plain characters for an open text session.
    Text { text: String },
    /// Focus leaves the text editor (commits the session).
    Blur,
}

impl Script {
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).context("failed to parse replay script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read replay script {}", path.display()))?;
        Self::from_json(&source).with_context(|| format!("in {}", path.display()))
    }
}

/// Feeds every event into `input`.
pub fn apply(input: &mut InputState, events: &[ScriptEvent]) -> Result<()> {
    for (index, event) in events.iter().enumerate() {
        log::trace!("Replay event {}: {:?}", index, event);
        apply_event(input, event).with_context(|| format!("replay event #{}", index))?;
    }
    Ok(())
}

fn apply_event(input: &mut InputState, event: &ScriptEvent) -> Result<()> {
    match event {
        ScriptEvent::Tool { tool } => {
            input.select_tool(*tool);
        }
        ScriptEvent::Down { x, y, button } => {
            input.on_pointer_down(*button, Point::new(*x, *y));
        }
        ScriptEvent::Move { x, y } => {
            input.on_pointer_move(Point::new(*x, *y));
        }
        ScriptEvent::Up { x, y, button } => {
            input.on_pointer_up(*button, Point::new(*x, *y));
        }
        ScriptEvent::Leave => {
            input.on_pointer_leave();
        }
        ScriptEvent::Click { x, y } => {
            let point = Point::new(*x, *y);
            input.on_pointer_down(MouseButton::Left, point);
            input.on_pointer_up(MouseButton::Left, point);
            input.on_click(point);
        }
        ScriptEvent::DoubleClick { x, y } => {
            input.on_double_click(Point::new(*x, *y));
        }
        ScriptEvent::Drag { points } => {
            let Some((first, rest)) = points.split_first() else {
                bail!("drag needs at least one point");
            };
            input.on_pointer_down(MouseButton::Left, Point::new(first[0], first[1]));
            for p in rest {
                input.on_pointer_move(Point::new(p[0], p[1]));
            }
            let last = rest.last().unwrap_or(first);
            input.on_pointer_up(MouseButton::Left, Point::new(last[0], last[1]));
        }
        ScriptEvent::Key { key } => press_combination(input, key)?,
        ScriptEvent::Text { text } => {
            for ch in text.chars() {
                input.on_key_press(key_for_char(ch));
            }
        }
        ScriptEvent::Blur => {
            input.text_focus_lost();
        }
    }
    Ok(())
}

fn press_combination(input: &mut InputState, combination: &str) -> Result<()> {
    let binding = KeyBinding::parse(combination).map_err(anyhow::Error::msg)?;
    let key = named_key(&binding.key)
        .with_context(|| format!("unknown key '{}' in '{}'", binding.key, combination))?;

    let modifiers: Vec<Key> = [
        (binding.ctrl, Key::Ctrl),
        (binding.shift, Key::Shift),
        (binding.alt, Key::Alt),
    ]
    .into_iter()
    .filter_map(|(held, key)| held.then_some(key))
    .collect();

    for modifier in &modifiers {
        input.on_key_press(*modifier);
    }
    input.on_key_press(key);
    input.on_key_release(key);
    for modifier in modifiers.iter().rev() {
        input.on_key_release(*modifier);
    }
    Ok(())
}

fn named_key(name: &str) -> Option<Key> {
    let key = match name.to_ascii_lowercase().as_str() {
        "escape" | "esc" => Key::Escape,
        "return" | "enter" => Key::Return,
        "backspace" => Key::Backspace,
        "tab" => Key::Tab,
        "space" => Key::Space,
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Key::Char(ch),
                _ => return None,
            }
        }
    };
    Some(key)
}

fn key_for_char(ch: char) -> Key {
    match ch {
        ' ' => Key::Space,
        '\t' => Key::Tab,
        other => Key::Char(other),
    }
}
