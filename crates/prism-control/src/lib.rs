//! Prism Control - input bindings for the editor
//!
//! Maps key presses to editor [`Action`]s. Bindings carry a
//! [`ShortcutContext`] so canvas shortcuts stay quiet while a text field has
//! focus, and drawing-only shortcuts fire only while a polygon is being drawn.
//!
//! ```rust
//! use prism_control::{Action, InputContext, Key, KeyBindings, Modifiers};
//! use prism_core::ShapeKind;
//!
//! let bindings = KeyBindings::new();
//! let action = bindings.find_action(Key::Char('r'), &Modifiers::new(), &InputContext::default());
//! assert_eq!(action, Some(Action::AddShape(ShapeKind::Rect)));
//! ```

#![allow(missing_docs)]

/// Error types
pub mod error;
/// Keyboard shortcuts
pub mod shortcuts;

pub use error::{ControlError, Result};
pub use shortcuts::{
    Action, DefaultShortcuts, InputContext, Key, KeyBindings, KeyBindingsData, Modifiers, Shortcut,
    ShortcutContext,
};
