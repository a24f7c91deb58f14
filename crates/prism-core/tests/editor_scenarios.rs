use prism_core::audio::FixedAudio;
use prism_core::{
    resolve_option, AudioFeed, AudioFrame, AudioLevels, DragState, Editor, EffectsPatch, Fill,
    InteractionController, LayerPatch, OpacityMode, OpacityParams, PointerButton, ProjectState,
    ShapeGeometry, ShapeKind, ShapePatch, Vec2, Visual, VisualId,
};

fn editor_with_triangle() -> (Editor, u64) {
    let mut editor = Editor::with_state(ProjectState::default());
    let (shape_id, _) = editor
        .add_polygon(vec![
            Vec2::new(100.0, 100.0),
            Vec2::new(300.0, 100.0),
            Vec2::new(200.0, 300.0),
        ])
        .unwrap();
    (editor, shape_id)
}

#[test]
fn dunes_option_falls_back_to_registry() {
    let mut editor = Editor::default();
    let (shape_id, _) = editor.add_shape(ShapeKind::Rect);
    editor
        .update_shape(
            shape_id,
            &ShapePatch {
                visual: Some(Visual::generative(VisualId::Dunes)),
                ..Default::default()
            },
            true,
        )
        .unwrap();
    editor
        .update_shape(shape_id, &ShapePatch::option("frequencyX", 0.05), true)
        .unwrap();

    let shape = editor.state().shape(shape_id).unwrap();
    assert_eq!(resolve_option(shape, "frequencyX"), 0.05);
    assert_eq!(resolve_option(shape, "frequencyY"), 0.2);
}

#[test]
fn point_drag_commits_single_entry() {
    let (mut editor, shape_id) = editor_with_triangle();
    let mut ctl = InteractionController::new();
    let before = editor.history().len();

    ctl.pointer_down(&mut editor, Vec2::new(100.0, 100.0), PointerButton::Primary);
    assert!(matches!(ctl.state(), DragState::DraggingPoint { handle: 0, .. }));
    for step in 1..=10 {
        let t = step as f32 / 10.0;
        ctl.pointer_move(&mut editor, Vec2::new(100.0 + 50.0 * t, 100.0 + 20.0 * t));
        assert_eq!(editor.history().len(), before);
    }
    ctl.pointer_up(&mut editor);

    assert_eq!(editor.history().len(), before + 1);
    let points = editor.state().shape(shape_id).unwrap().points().to_vec();
    assert_eq!(points[0], Vec2::new(150.0, 120.0));

    // The entry before the drag still holds the original position
    editor.undo();
    assert_eq!(
        editor.state().shape(shape_id).unwrap().points()[0],
        Vec2::new(100.0, 100.0)
    );
}

#[test]
fn three_clicks_draw_a_triangle() {
    let mut editor = Editor::default();
    let mut ctl = InteractionController::new();
    let shapes_before = editor.state().shapes.len();
    let history_before = editor.history().len();

    ctl.toggle_drawing(&mut editor);
    for (x, y) in [(600.0, 500.0), (700.0, 500.0), (650.0, 580.0)] {
        ctl.pointer_down(&mut editor, Vec2::new(x, y), PointerButton::Primary);
        ctl.pointer_up(&mut editor);
    }
    ctl.toggle_drawing(&mut editor);

    assert_eq!(*ctl.state(), DragState::Idle);
    assert_eq!(editor.state().shapes.len(), shapes_before + 1);
    assert_eq!(editor.state().layers.len(), shapes_before + 1);
    assert_eq!(editor.history().len(), history_before + 1);

    let shape = editor.selected_shape().unwrap();
    assert_eq!(shape.kind(), ShapeKind::Polygon);
    assert_eq!(shape.points().len(), 3);
}

#[test]
fn cancelled_drawing_adds_nothing() {
    let mut editor = Editor::default();
    let mut ctl = InteractionController::new();
    ctl.start_drawing();
    for (x, y) in [(10.0, 10.0), (90.0, 10.0), (50.0, 70.0), (20.0, 60.0)] {
        ctl.pointer_down(&mut editor, Vec2::new(x, y), PointerButton::Primary);
    }
    ctl.cancel_drawing();
    assert_eq!(editor.state().shapes.len(), 2);
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn audio_bass_saturates_opacity() {
    let mut editor = Editor::default();
    editor
        .update_layer(
            3,
            &LayerPatch {
                opacity_mode: Some(OpacityMode::AudioBass),
                opacity_params: Some(OpacityParams {
                    sensitivity: Some(2.0),
                    min: Some(0.0),
                    max: Some(100.0),
                    speed: None,
                }),
                ..Default::default()
            },
            true,
        )
        .unwrap();

    let mut feed = AudioFeed::new(Box::new(FixedAudio::new(AudioLevels::new(60.0, 0.0, 0.0))));
    let audio = feed.tick(0.0).clone();
    let frame = editor.render(0.0, &audio);
    let op = frame.ops.iter().find(|op| op.layer_id == 3).unwrap();
    assert_eq!(op.opacity, 1.0);
}

#[test]
fn hidden_layers_are_not_rendered() {
    let mut editor = Editor::default();
    editor.update_layer(4, &LayerPatch::visible(false), true).unwrap();
    let frame = editor.render(0.0, &AudioFrame::default());
    assert_eq!(frame.ops.len(), 1);
    assert_eq!(frame.ops[0].layer_id, 3);
}

#[test]
fn render_follows_layer_order() {
    let mut editor = Editor::default();
    editor.move_layer_up(3).unwrap();
    let frame = editor.render(0.0, &AudioFrame::default());
    let order: Vec<_> = frame.ops.iter().map(|op| op.layer_id).collect();
    assert_eq!(order, vec![4, 3]);
}

#[test]
fn uploaded_video_renders_as_media() {
    let mut editor = Editor::default();
    let (shape_id, _) = editor
        .upload_media("loop.webm", "blob:loop", None, Some(Vec2::new(1920.0, 1080.0)))
        .unwrap();
    let frame = editor.render(16.0, &AudioFrame::default());
    let op = frame.ops.iter().find(|op| op.shape_id == shape_id).unwrap();
    assert!(matches!(&op.fill, Fill::Media { url, .. } if url == "blob:loop"));
}

#[test]
fn scene_load_is_undoable() {
    let mut editor = Editor::default();
    let scene = editor.save_scene();
    editor.add_shape(ShapeKind::Circle);
    let with_circle = editor.state().clone();

    editor.load_scene(scene).unwrap();
    assert_eq!(editor.state().shapes.len(), 2);
    editor.undo();
    assert_eq!(editor.state(), &with_circle);
}

#[test]
fn rotated_shape_handle_drag_uses_local_space() {
    let mut editor = Editor::default();
    let (shape_id, layer_id) = editor.add_layer(
        ShapeGeometry::rect(Vec2::new(100.0, 100.0), Vec2::new(300.0, 200.0)),
        Visual::generative(VisualId::Grid),
        "Rotated",
    );
    editor
        .update_shape(
            shape_id,
            &ShapePatch {
                rotation: Some(90.0),
                ..Default::default()
            },
            true,
        )
        .unwrap();
    assert_eq!(editor.selected_layer_id(), Some(layer_id));

    let handle = editor.state().shape(shape_id).unwrap().world_handles()[0].position;
    let mut ctl = InteractionController::new();
    ctl.pointer_down(&mut editor, handle, PointerButton::Primary);
    assert!(matches!(ctl.state(), DragState::DraggingPoint { handle: 0, .. }));
    ctl.pointer_move(&mut editor, handle);
    ctl.pointer_up(&mut editor);

    // Dropping the handle where it was picked leaves the geometry unchanged
    let shape = editor.state().shape(shape_id).unwrap();
    let p = shape.points()[0];
    assert!((p - Vec2::new(100.0, 100.0)).length() < 1e-3);
}

#[test]
fn undo_during_drag_keeps_committed_history() {
    let mut editor = Editor::default();
    let blur = EffectsPatch {
        blur: Some(5.0),
        ..Default::default()
    };
    editor.update_effects(&blur, true);

    let mut ctl = InteractionController::new();
    ctl.pointer_down(&mut editor, Vec2::new(250.0, 250.0), PointerButton::Primary);
    assert!(matches!(ctl.state(), DragState::DraggingShape { .. }));
    assert!(!editor.undo());
    ctl.pointer_move(&mut editor, Vec2::new(280.0, 250.0));
    ctl.pointer_up(&mut editor);

    assert_eq!(editor.history().len(), 3);
    assert_eq!(editor.state().effects.blur, 5.0);
    assert_eq!(editor.state().shape(1).unwrap().points()[0], Vec2::new(180.0, 150.0));

    editor.undo();
    assert_eq!(editor.state().effects.blur, 5.0);
    assert_eq!(editor.state().shape(1).unwrap().points()[0], Vec2::new(150.0, 150.0));
    editor.undo();
    assert_eq!(editor.state(), &ProjectState::initial());
}

#[test]
fn scene_load_during_drag_is_its_own_entry() {
    let mut editor = Editor::default();
    let scene = editor.save_scene();
    editor.add_shape(ShapeKind::Rect);
    let with_rect = editor.state().clone();

    let mut ctl = InteractionController::new();
    ctl.pointer_down(&mut editor, Vec2::new(250.0, 250.0), PointerButton::Primary);
    ctl.pointer_move(&mut editor, Vec2::new(260.0, 250.0));
    editor.load_scene(scene).unwrap();
    ctl.pointer_up(&mut editor);

    assert_eq!(editor.state(), &ProjectState::initial());
    editor.undo();
    assert_ne!(editor.state(), &with_rect);
    editor.undo();
    assert_eq!(editor.state(), &with_rect);
}
