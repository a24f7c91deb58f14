//! Recorded input events
//!
//! A replay file is a JSON array of timestamped events:
//!
//! ```json
//! [
//!   {"at_ms": 0, "type": "key", "key": "r"},
//!   {"at_ms": 16, "type": "pointer-down", "x": 250, "y": 250},
//!   {"at_ms": 32, "type": "pointer-move", "x": 300, "y": 260},
//!   {"at_ms": 48, "type": "pointer-up"}
//! ]
//! ```

use anyhow::{Context, Result};
use prism_control::Modifiers;
use prism_core::PointerButton;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

fn primary() -> PointerButton {
    PointerButton::Primary
}

/// One input event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InputEvent {
    /// Button press on the canvas
    PointerDown {
        x: f32,
        y: f32,
        #[serde(default = "primary")]
        button: PointerButton,
    },
    /// Pointer motion
    PointerMove { x: f32, y: f32 },
    /// Button release
    PointerUp,
    /// Pointer left the canvas
    PointerLeave,
    /// Key press, DOM key name
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        text_input_focused: bool,
    },
    /// Raw answer from a suggestion service for a shape
    Suggestion { shape_id: u64, response: String },
    /// Load a previously saved scene
    LoadScene { scene_id: u64 },
}

/// An event and the time it fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayEvent {
    /// Milliseconds from the start of the run
    pub at_ms: f64,
    #[serde(flatten)]
    pub event: InputEvent,
}

/// Time-ordered event queue
#[derive(Debug, Default)]
pub struct Replay {
    events: VecDeque<ReplayEvent>,
}

impl Replay {
    /// Build from events in any order; ties keep file order
    pub fn new(mut events: Vec<ReplayEvent>) -> Self {
        events.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
        Self {
            events: events.into(),
        }
    }

    /// Parse a JSON event list
    pub fn from_json(json: &str) -> Result<Self> {
        let events: Vec<ReplayEvent> = serde_json::from_str(json)?;
        Ok(Self::new(events))
    }

    /// Load a replay file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay: {:?}", path))?;
        Self::from_json(&json).with_context(|| format!("Invalid replay file: {:?}", path))
    }

    /// Remove and return every event due at or before `time_ms`
    pub fn due(&mut self, time_ms: f64) -> Vec<InputEvent> {
        let mut due = Vec::new();
        while self.events.front().is_some_and(|e| e.at_ms <= time_ms) {
            if let Some(e) = self.events.pop_front() {
                due.push(e.event);
            }
        }
        due
    }

    /// Events not yet delivered
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_order() {
        let mut replay = Replay::from_json(
            r#"[
                {"at_ms": 20, "type": "pointer-up"},
                {"at_ms": 0, "type": "pointer-down", "x": 1, "y": 2},
                {"at_ms": 10, "type": "key", "key": "z", "modifiers": {"ctrl": true}}
            ]"#,
        )
        .unwrap();
        assert_eq!(replay.remaining(), 3);

        let first = replay.due(5.0);
        assert_eq!(
            first,
            vec![InputEvent::PointerDown {
                x: 1.0,
                y: 2.0,
                button: PointerButton::Primary
            }]
        );
        let rest = replay.due(100.0);
        assert_eq!(rest.len(), 2);
        assert!(matches!(&rest[0], InputEvent::Key { modifiers, .. } if modifiers.ctrl));
        assert_eq!(replay.remaining(), 0);
    }

    #[test]
    fn test_bad_replay() {
        assert!(Replay::from_json(r#"[{"at_ms": 0, "type": "teleport"}]"#).is_err());
    }
}
