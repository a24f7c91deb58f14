use prism_control::{Action, InputContext, Key, KeyBindings, Modifiers, ShortcutContext};
use prism_core::ShapeKind;
use tempfile::tempdir;

#[test]
fn shape_keys_ignored_while_typing() {
    let bindings = KeyBindings::new();
    let typing = InputContext {
        text_input_focused: true,
        drawing: false,
    };
    for c in ['r', 'c', 'p'] {
        assert!(bindings.find_action(Key::char(c), &Modifiers::new(), &typing).is_none());
    }
    // Global bindings still fire
    assert_eq!(
        bindings.find_action(Key::Char('s'), &Modifiers::ctrl(), &typing),
        Some(Action::SaveScene)
    );
}

#[test]
fn shape_keys_ignored_while_drawing() {
    let bindings = KeyBindings::new();
    let drawing = InputContext {
        text_input_focused: false,
        drawing: true,
    };
    for c in ['r', 'c', 'p'] {
        assert!(bindings.find_action(Key::char(c), &Modifiers::new(), &drawing).is_none());
    }
    // Toggling still finishes the polygon
    assert_eq!(
        bindings.find_action(Key::Char('d'), &Modifiers::new(), &drawing),
        Some(Action::ToggleDrawing)
    );
}

#[test]
fn uppercase_letters_match() {
    let bindings = KeyBindings::new();
    let key: Key = "P".parse().unwrap();
    assert_eq!(
        bindings.find_action(key, &Modifiers::new(), &InputContext::default()),
        Some(Action::AddShape(ShapeKind::Polygon))
    );
}

#[test]
fn escape_only_cancels_while_drawing() {
    let bindings = KeyBindings::new();
    let idle = InputContext::default();
    let drawing = InputContext {
        text_input_focused: false,
        drawing: true,
    };
    assert!(bindings.find_action(Key::Escape, &Modifiers::new(), &idle).is_none());
    assert_eq!(
        bindings.find_action(Key::Escape, &Modifiers::new(), &drawing),
        Some(Action::CancelDrawing)
    );
}

#[test]
fn undo_redo_bindings() {
    let bindings = KeyBindings::new();
    let idle = InputContext::default();
    assert_eq!(
        bindings.find_action(Key::Char('z'), &Modifiers::ctrl(), &idle),
        Some(Action::Undo)
    );
    assert_eq!(
        bindings.find_action(Key::Char('y'), &Modifiers::ctrl(), &idle),
        Some(Action::Redo)
    );
    assert_eq!(bindings.find_shortcuts_for_action(&Action::Redo).len(), 2);
    assert!(bindings.is_key_bound(Key::Char('z'), &Modifiers::ctrl(), ShortcutContext::Canvas));
}

#[test]
fn bindings_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bindings.json");

    let mut bindings = KeyBindings::new();
    bindings.remove_shortcut(0);
    bindings.save_to_file(&path).unwrap();

    let loaded = KeyBindings::load_from_file(&path).unwrap();
    assert_eq!(loaded.get_shortcuts(), bindings.get_shortcuts());

    let mut loaded = loaded;
    loaded.reset_to_defaults();
    assert_eq!(loaded.get_shortcuts(), KeyBindings::new().get_shortcuts());
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(KeyBindings::load_from_file(dir.path().join("absent.json")).is_err());
}
