//! Keys, modifiers, actions and shortcut definitions

use crate::error::ControlError;
use prism_core::ShapeKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A keyboard key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Printable character, stored lowercase
    Char(char),
    Escape,
    Enter,
    Space,
    Tab,
    Backspace,
    Delete,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

impl Key {
    /// Character key; letters are folded to lowercase
    pub fn char(c: char) -> Self {
        Key::Char(c.to_ascii_lowercase())
    }
}

impl FromStr for Key {
    type Err = ControlError;

    /// Parse a DOM-style key name (`"r"`, `"R"`, `"Escape"`, `" "`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(match c {
                ' ' => Key::Space,
                c => Key::char(c),
            });
        }
        match s.to_ascii_lowercase().as_str() {
            "escape" | "esc" => Ok(Key::Escape),
            "enter" | "return" => Ok(Key::Enter),
            "space" => Ok(Key::Space),
            "tab" => Ok(Key::Tab),
            "backspace" => Ok(Key::Backspace),
            "delete" | "del" => Ok(Key::Delete),
            "arrowup" | "up" => Ok(Key::ArrowUp),
            "arrowdown" | "down" => Ok(Key::ArrowDown),
            "arrowleft" | "left" => Ok(Key::ArrowLeft),
            "arrowright" | "right" => Ok(Key::ArrowRight),
            _ => Err(ControlError::UnknownKey(s.to_string())),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Modifier keys held during a press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    /// Cmd on macOS
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers
    pub fn new() -> Self {
        Self::default()
    }

    /// Ctrl only
    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    /// Ctrl+Shift
    pub fn ctrl_shift() -> Self {
        Self {
            ctrl: true,
            shift: true,
            ..Self::default()
        }
    }

    /// Shift only
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.ctrl, "Ctrl"),
            (self.alt, "Alt"),
            (self.shift, "Shift"),
            (self.meta, "Meta"),
        ];
        for (held, name) in names {
            if held {
                write!(f, "{}+", name)?;
            }
        }
        Ok(())
    }
}

/// Something a shortcut can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", content = "kind", rename_all = "kebab-case")]
pub enum Action {
    /// Create a shape of the given kind with its defaults
    AddShape(ShapeKind),
    /// Enter or finish polygon drawing
    ToggleDrawing,
    /// Abandon the polygon being drawn
    CancelDrawing,
    /// Step back in history
    Undo,
    /// Step forward in history
    Redo,
    /// Snapshot the project as a scene
    SaveScene,
}

/// Where a shortcut is allowed to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShortcutContext {
    /// Always
    Global,
    /// Canvas focus: not while a text input or select has focus
    Canvas,
    /// Canvas focus and not drawing a polygon
    Idle,
    /// Only while a polygon is being drawn
    Drawing,
}

/// Focus and mode at the time of a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputContext {
    /// A text input or select element has keyboard focus
    pub text_input_focused: bool,
    /// Polygon drawing mode is active
    pub drawing: bool,
}

impl InputContext {
    /// Whether `context` is active
    pub fn allows(&self, context: ShortcutContext) -> bool {
        match context {
            ShortcutContext::Global => true,
            ShortcutContext::Canvas => !self.text_input_focused,
            ShortcutContext::Idle => !self.text_input_focused && !self.drawing,
            ShortcutContext::Drawing => self.drawing,
        }
    }
}

/// A single key binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortcut {
    pub key: Key,
    pub modifiers: Modifiers,
    pub action: Action,
    pub context: ShortcutContext,
    pub description: String,
    pub enabled: bool,
}

impl Shortcut {
    /// Create an enabled shortcut
    pub fn new(
        key: Key,
        modifiers: Modifiers,
        action: Action,
        context: ShortcutContext,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key,
            modifiers,
            action,
            context,
            description: description.into(),
            enabled: true,
        }
    }

    /// Exact key and modifier match
    pub fn matches(&self, key: Key, modifiers: &Modifiers) -> bool {
        self.key == key && self.modifiers == *modifiers
    }

    /// Human-readable combo, e.g. `Ctrl+Shift+Z`
    pub fn to_shortcut_string(&self) -> String {
        format!("{}{}", self.modifiers, self.key)
    }
}

/// Built-in bindings
pub struct DefaultShortcuts;

impl DefaultShortcuts {
    /// Every default binding
    pub fn all() -> Vec<Shortcut> {
        use ShortcutContext::*;
        vec![
            Shortcut::new(
                Key::Char('r'),
                Modifiers::new(),
                Action::AddShape(ShapeKind::Rect),
                Idle,
                "Add rectangle",
            ),
            Shortcut::new(
                Key::Char('c'),
                Modifiers::new(),
                Action::AddShape(ShapeKind::Circle),
                Idle,
                "Add circle",
            ),
            Shortcut::new(
                Key::Char('p'),
                Modifiers::new(),
                Action::AddShape(ShapeKind::Polygon),
                Idle,
                "Add polygon",
            ),
            Shortcut::new(
                Key::Escape,
                Modifiers::new(),
                Action::CancelDrawing,
                Drawing,
                "Cancel drawing",
            ),
            Shortcut::new(
                Key::Enter,
                Modifiers::new(),
                Action::ToggleDrawing,
                Drawing,
                "Finish drawing",
            ),
            Shortcut::new(
                Key::Char('d'),
                Modifiers::new(),
                Action::ToggleDrawing,
                Canvas,
                "Toggle polygon drawing",
            ),
            Shortcut::new(Key::Char('z'), Modifiers::ctrl(), Action::Undo, Canvas, "Undo"),
            Shortcut::new(
                Key::Char('z'),
                Modifiers::ctrl_shift(),
                Action::Redo,
                Canvas,
                "Redo",
            ),
            Shortcut::new(Key::Char('y'), Modifiers::ctrl(), Action::Redo, Canvas, "Redo"),
            Shortcut::new(
                Key::Char('s'),
                Modifiers::ctrl(),
                Action::SaveScene,
                Global,
                "Save scene",
            ),
        ]
    }
}
