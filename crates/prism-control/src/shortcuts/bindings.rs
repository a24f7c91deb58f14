//! Keyboard shortcut bindings manager

use super::{Action, DefaultShortcuts, InputContext, Key, Modifiers, Shortcut, ShortcutContext};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Key binding manager
#[derive(Debug, Clone)]
pub struct KeyBindings {
    shortcuts: Vec<Shortcut>,
}

/// Serializable key bindings for save/load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindingsData {
    pub shortcuts: Vec<Shortcut>,
}

impl KeyBindings {
    /// Create a new key bindings manager with default shortcuts
    pub fn new() -> Self {
        Self {
            shortcuts: DefaultShortcuts::all(),
        }
    }

    /// Create an empty key bindings manager
    pub fn empty() -> Self {
        Self {
            shortcuts: Vec::new(),
        }
    }

    /// Find the action for a key press in `input` context
    pub fn find_action(
        &self,
        key: Key,
        modifiers: &Modifiers,
        input: &InputContext,
    ) -> Option<Action> {
        let found = self
            .shortcuts
            .iter()
            .filter(|s| s.enabled && input.allows(s.context))
            .find(|s| s.matches(key, modifiers))
            .map(|s| s.action);
        if found.is_none() {
            debug!("No binding for {}{} in {:?}", modifiers, key, input);
        }
        found
    }

    /// Add a new shortcut
    pub fn add_shortcut(&mut self, shortcut: Shortcut) {
        self.shortcuts.push(shortcut);
    }

    /// Remove a shortcut by index
    pub fn remove_shortcut(&mut self, index: usize) -> Option<Shortcut> {
        if index < self.shortcuts.len() {
            Some(self.shortcuts.remove(index))
        } else {
            None
        }
    }

    /// Update a shortcut by index
    pub fn update_shortcut(&mut self, index: usize, shortcut: Shortcut) -> bool {
        match self.shortcuts.get_mut(index) {
            Some(slot) => {
                *slot = shortcut;
                true
            }
            None => false,
        }
    }

    /// Get all shortcuts
    pub fn get_shortcuts(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    /// Find shortcuts for a specific action
    pub fn find_shortcuts_for_action(&self, action: &Action) -> Vec<&Shortcut> {
        self.shortcuts
            .iter()
            .filter(|s| &s.action == action)
            .collect()
    }

    /// Check if a key combination is already bound in `context`
    pub fn is_key_bound(&self, key: Key, modifiers: &Modifiers, context: ShortcutContext) -> bool {
        self.shortcuts.iter().any(|s| {
            s.enabled
                && s.matches(key, modifiers)
                && (s.context == context || s.context == ShortcutContext::Global)
        })
    }

    /// Reset to default shortcuts
    pub fn reset_to_defaults(&mut self) {
        self.shortcuts = DefaultShortcuts::all();
        info!("Key bindings reset to defaults");
    }

    /// Load from JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let bindings = Self::from_json(&json)?;
        info!("Loaded {} shortcuts", bindings.shortcuts.len());
        Ok(bindings)
    }

    /// Save to JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        info!("Saved {} shortcuts", self.shortcuts.len());
        Ok(())
    }

    /// Export to JSON string
    pub fn to_json(&self) -> Result<String> {
        let data = KeyBindingsData {
            shortcuts: self.shortcuts.clone(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Import from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let data: KeyBindingsData = serde_json::from_str(json)?;
        Ok(Self {
            shortcuts: data.shortcuts,
        })
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::ShapeKind;

    #[test]
    fn test_find_action() {
        let bindings = KeyBindings::new();
        let idle = InputContext::default();

        let action = bindings.find_action(Key::Char('c'), &Modifiers::new(), &idle);
        assert_eq!(action, Some(Action::AddShape(ShapeKind::Circle)));

        let action = bindings.find_action(Key::Char('z'), &Modifiers::ctrl_shift(), &idle);
        assert_eq!(action, Some(Action::Redo));
    }

    #[test]
    fn test_add_remove_shortcut() {
        let mut bindings = KeyBindings::empty();
        bindings.add_shortcut(Shortcut::new(
            Key::Char('t'),
            Modifiers::new(),
            Action::Undo,
            ShortcutContext::Global,
            "Test",
        ));
        assert_eq!(bindings.get_shortcuts().len(), 1);
        assert!(bindings.remove_shortcut(0).is_some());
        assert!(bindings.get_shortcuts().is_empty());
        assert!(bindings.remove_shortcut(0).is_none());
    }

    #[test]
    fn test_disabled_shortcut_is_skipped() {
        let mut bindings = KeyBindings::new();
        let index = bindings
            .get_shortcuts()
            .iter()
            .position(|s| s.action == Action::AddShape(ShapeKind::Rect))
            .unwrap();
        let mut shortcut = bindings.get_shortcuts()[index].clone();
        shortcut.enabled = false;
        assert!(bindings.update_shortcut(index, shortcut));
        let idle = InputContext::default();
        let action = bindings.find_action(Key::Char('r'), &Modifiers::new(), &idle);
        assert!(action.is_none());
    }

    #[test]
    fn test_serialization() {
        let bindings = KeyBindings::new();
        let json = bindings.to_json().unwrap();
        let loaded = KeyBindings::from_json(&json).unwrap();
        assert_eq!(bindings.get_shortcuts(), loaded.get_shortcuts());
    }
}
