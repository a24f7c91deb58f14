//! Routes input events and shortcut actions onto the editor

use crate::replay::InputEvent;
use prism_control::{Action, InputContext, Key, KeyBindings};
use prism_core::{Editor, InteractionController, Vec2};
use tracing::{debug, warn};

/// Editor plus the pieces that turn raw input into edits
pub struct Session {
    pub editor: Editor,
    pub interaction: InteractionController,
    pub bindings: KeyBindings,
}

impl Session {
    /// Wrap an editor with default bindings
    pub fn new(editor: Editor) -> Self {
        Self {
            editor,
            interaction: InteractionController::new(),
            bindings: KeyBindings::new(),
        }
    }

    /// Replace the key bindings
    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Perform a shortcut action
    pub fn perform(&mut self, action: Action) {
        debug!("Action: {:?}", action);
        match action {
            Action::AddShape(kind) => {
                self.editor.add_shape(kind);
            }
            Action::ToggleDrawing => self.interaction.toggle_drawing(&mut self.editor),
            Action::CancelDrawing => self.interaction.cancel_drawing(),
            Action::Undo => {
                self.editor.undo();
            }
            Action::Redo => {
                self.editor.redo();
            }
            Action::SaveScene => {
                self.editor.save_scene();
            }
        }
    }

    /// Apply one recorded or live input event
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { x, y, button } => {
                self.interaction
                    .pointer_down(&mut self.editor, Vec2::new(x, y), button)
            }
            InputEvent::PointerMove { x, y } => self
                .interaction
                .pointer_move(&mut self.editor, Vec2::new(x, y)),
            InputEvent::PointerUp => self.interaction.pointer_up(&mut self.editor),
            InputEvent::PointerLeave => self.interaction.pointer_leave(&mut self.editor),
            InputEvent::Key {
                key,
                modifiers,
                text_input_focused,
            } => {
                let key: Key = match key.parse() {
                    Ok(key) => key,
                    Err(e) => {
                        warn!("{}", e);
                        return;
                    }
                };
                let context = InputContext {
                    text_input_focused,
                    drawing: self.interaction.is_drawing(),
                };
                if let Some(action) = self.bindings.find_action(key, &modifiers, &context) {
                    self.perform(action);
                }
            }
            InputEvent::Suggestion { shape_id, response } => {
                self.editor.apply_suggestion(shape_id, Ok(response));
            }
            InputEvent::LoadScene { scene_id } => {
                if let Err(e) = self.editor.load_scene(scene_id) {
                    warn!("Scene load failed: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_control::Modifiers;
    use prism_core::{DragState, PointerButton};

    fn key(name: &str) -> InputEvent {
        InputEvent::Key {
            key: name.to_string(),
            modifiers: Modifiers::new(),
            text_input_focused: false,
        }
    }

    #[test]
    fn test_shape_keys() {
        let mut session = Session::new(Editor::default());
        session.handle(key("r"));
        session.handle(key("C"));
        assert_eq!(session.editor.state().layers.len(), 4);
        assert_eq!(session.editor.selected_layer().unwrap().name, "Circle Layer");

        session.handle(InputEvent::Key {
            key: "p".into(),
            modifiers: Modifiers::new(),
            text_input_focused: true,
        });
        assert_eq!(session.editor.state().layers.len(), 4);
    }

    #[test]
    fn test_escape_discards_drawing() {
        let mut session = Session::new(Editor::default());
        session.handle(key("d"));
        assert!(session.interaction.is_drawing());
        for (x, y) in [(0.0, 0.0), (50.0, 0.0), (25.0, 40.0)] {
            session.handle(InputEvent::PointerDown {
                x,
                y,
                button: PointerButton::Primary,
            });
        }
        session.handle(key("Escape"));
        assert_eq!(*session.interaction.state(), DragState::Idle);
        assert_eq!(session.editor.state().shapes.len(), 2);
    }

    #[test]
    fn test_shape_keys_wait_for_drawing_to_end() {
        let mut session = Session::new(Editor::default());
        session.handle(key("d"));
        session.handle(key("r"));
        assert!(session.interaction.is_drawing());
        assert_eq!(session.editor.state().shapes.len(), 2);

        session.handle(key("Escape"));
        session.handle(key("r"));
        assert_eq!(session.editor.state().shapes.len(), 3);
    }

    #[test]
    fn test_undo_key_ignored_mid_drag() {
        let mut session = Session::new(Editor::default());
        session.handle(key("c"));
        session.handle(InputEvent::PointerDown {
            x: 330.0,
            y: 320.0,
            button: PointerButton::Primary,
        });
        assert!(matches!(
            session.interaction.state(),
            DragState::DraggingShape { .. }
        ));
        session.handle(InputEvent::Key {
            key: "z".into(),
            modifiers: Modifiers::ctrl(),
            text_input_focused: false,
        });
        session.handle(InputEvent::PointerMove { x: 350.0, y: 320.0 });
        session.handle(InputEvent::PointerUp);

        assert_eq!(session.editor.state().layers.len(), 3);
        assert_eq!(session.editor.history().len(), 3);
    }

    #[test]
    fn test_undo_key() {
        let mut session = Session::new(Editor::default());
        session.handle(key("r"));
        session.handle(InputEvent::Key {
            key: "z".into(),
            modifiers: Modifiers::ctrl(),
            text_input_focused: false,
        });
        assert_eq!(session.editor.state().layers.len(), 2);
    }
}
