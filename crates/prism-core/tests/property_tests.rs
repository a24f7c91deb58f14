use prism_core::opacity::{audio_reactive, pulse};
use prism_core::visual::{default_options, resolve_option};
use prism_core::{
    EffectsPatch, Editor, History, LayerPatch, OpacityParams, ProjectState, Shape, ShapeGeometry,
    ShapeKind, ShapePatch, Vec2, Visual, VisualId,
};
use proptest::prelude::*;
use std::f64::consts::TAU;

fn kind() -> impl Strategy<Value = ShapeKind> {
    prop_oneof![
        Just(ShapeKind::Rect),
        Just(ShapeKind::Circle),
        Just(ShapeKind::Polygon)
    ]
}

fn blur_state(blur: f32) -> ProjectState {
    let mut state = ProjectState::initial();
    state.effects.blur = blur;
    state
}

proptest! {
    #[test]
    fn pulse_is_periodic(
        speed in 0.1f32..10.0,
        min in 0f32..100.0,
        max in 0f32..100.0,
        t in 0f64..100_000.0,
    ) {
        let params = OpacityParams {
            speed: Some(speed),
            min: Some(min),
            max: Some(max),
            sensitivity: None,
        };
        let period_ms = TAU / f64::from(speed) * 1000.0;
        let a = pulse(&params, t);
        let b = pulse(&params, t + period_ms);
        prop_assert!((a - b).abs() < 1e-3, "{} vs {}", a, b);
    }

    #[test]
    fn pulse_stays_between_bounds(
        speed in 0.1f32..10.0,
        min in 0f32..100.0,
        max in 0f32..100.0,
        t in 0f64..1e6,
    ) {
        let params = OpacityParams {
            speed: Some(speed),
            min: Some(min),
            max: Some(max),
            sensitivity: None,
        };
        let v = pulse(&params, t);
        let (lo, hi) = (min.min(max) / 100.0, min.max(max) / 100.0);
        prop_assert!(v >= lo - 1e-5 && v <= hi + 1e-5);
    }

    #[test]
    fn audio_opacity_is_monotonic(
        sensitivity in 0.1f32..5.0,
        max in 0f32..100.0,
        a in 0f32..100.0,
        b in 0f32..100.0,
    ) {
        // Non-decreasing in level when min <= max
        let params = OpacityParams {
            speed: None,
            min: Some(0.0),
            max: Some(max),
            sensitivity: Some(sensitivity),
        };
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(audio_reactive(&params, low) <= audio_reactive(&params, high));
        prop_assert!(audio_reactive(&params, high) <= max / 100.0 + 1e-6);
    }

    #[test]
    fn commits_grow_history(n in 1usize..30) {
        let mut history = History::new(blur_state(0.0));
        for i in 1..=n {
            history.set_state(blur_state(i as f32), true);
        }
        prop_assert_eq!(history.len(), n + 1);
        prop_assert_eq!(history.index(), n);
    }

    #[test]
    fn drafts_never_grow_history(values in prop::collection::vec(0f32..50.0, 1..40)) {
        let mut history = History::new(blur_state(0.0));
        for v in values {
            history.set_state(blur_state(v), false);
        }
        prop_assert_eq!(history.len(), 1);
    }

    #[test]
    fn undo_redo_is_identity(n in 1usize..15, steps in 0usize..15) {
        let mut history = History::new(blur_state(0.0));
        for i in 1..=n {
            history.set_state(blur_state(i as f32), true);
        }
        let before = history.current().clone();
        let steps = steps.min(n);
        for _ in 0..steps {
            prop_assert!(history.undo());
        }
        for _ in 0..steps {
            prop_assert!(history.redo());
        }
        prop_assert_eq!(history.current(), &before);
    }

    #[test]
    fn deletion_keeps_pairs(
        kinds in prop::collection::vec(kind(), 0..8),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..8),
    ) {
        let mut editor = Editor::default();
        for kind in kinds {
            editor.add_shape(kind);
        }
        for pick in picks {
            let layers = &editor.state().layers;
            if layers.is_empty() {
                break;
            }
            let id = layers[pick.index(layers.len())].id;
            editor.delete_layer(id).unwrap();
            prop_assert!(editor.state().validate().is_ok());
            prop_assert_eq!(editor.state().shapes.len(), editor.state().layers.len());
        }
    }

    #[test]
    fn resolve_falls_back_to_registry(key in "[a-zA-Z]{1,12}") {
        let shape = Shape::new(
            1,
            ShapeGeometry::default_for(ShapeKind::Rect),
            Visual::generative(VisualId::Clouds),
        );
        let mut bare = shape.clone();
        bare.visual_options.clear();
        let expected = prism_core::visual::param_spec(VisualId::Clouds, &key)
            .map(|spec| spec.default_value)
            .unwrap_or(0.0);
        prop_assert_eq!(resolve_option(&bare, &key), expected);
    }

    #[test]
    fn visual_switch_resets_options(value in 0.0f32..1.0) {
        let mut editor = Editor::default();
        let (shape_id, _) = editor.add_shape(ShapeKind::Rect);
        let switch_to = |visual: &Visual| ShapePatch {
            visual: Some(visual.clone()),
            ..Default::default()
        };
        let dunes = Visual::generative(VisualId::Dunes);
        editor.update_shape(shape_id, &switch_to(&dunes), true).unwrap();
        editor.update_shape(shape_id, &ShapePatch::option("frequencyX", value), true).unwrap();

        let caustics = Visual::generative(VisualId::Caustics);
        editor.update_shape(shape_id, &switch_to(&caustics), true).unwrap();
        let shape = editor.state().shape(shape_id).unwrap();
        prop_assert_eq!(&shape.visual_options, &default_options(&caustics));
        prop_assert!(!shape.visual_options.contains_key("frequencyX"));
    }

    #[test]
    fn effects_slider_gesture_is_one_entry(values in prop::collection::vec(0f32..20.0, 1..20)) {
        let mut editor = Editor::default();
        editor.begin_gesture();
        for v in &values {
            editor.update_effects(&EffectsPatch { blur: Some(*v), ..Default::default() }, false);
        }
        editor.end_gesture();
        let last = *values.last().unwrap();
        let expected = if last == 0.0 { 1 } else { 2 };
        prop_assert_eq!(editor.history().len(), expected);
        prop_assert_eq!(editor.state().effects.blur, last);
    }

    #[test]
    fn hidden_layers_never_hit(x in 0f32..800.0, y in 0f32..600.0) {
        let mut editor = Editor::default();
        for id in [3, 4] {
            editor.update_layer(id, &LayerPatch::visible(false), true).unwrap();
        }
        prop_assert!(editor.layer_at(Vec2::new(x, y)).is_none());
    }
}
