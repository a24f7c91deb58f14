//! Project state: the unit of undo/redo and scene snapshots

use crate::geometry::{Shape, ShapeGeometry, ShapeId};
use crate::layer::{layer_color, BlendMode, Layer, LayerId};
use crate::visual::{Visual, VisualId};
use crate::{CoreError, Result, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Whole-output post-processing knobs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalEffects {
    /// Gaussian blur radius in px
    pub blur: f32,
    /// Brightness in percent (100 = unchanged)
    pub brightness: f32,
    /// Contrast in percent (100 = unchanged)
    pub contrast: f32,
    /// Hue rotation in degrees
    pub hue_rotate: f32,
    /// Saturation in percent (100 = unchanged)
    pub saturate: f32,
}

impl Default for GlobalEffects {
    fn default() -> Self {
        Self {
            blur: 0.0,
            brightness: 100.0,
            contrast: 100.0,
            hue_rotate: 0.0,
            saturate: 100.0,
        }
    }
}

impl GlobalEffects {
    /// CSS filter string applying all five adjustments in order
    pub fn css_filter(&self) -> String {
        format!(
            "blur({}px) brightness({}%) contrast({}%) hue-rotate({}deg) saturate({}%)",
            self.blur, self.brightness, self.contrast, self.hue_rotate, self.saturate
        )
    }

    /// True when the output passes through unchanged
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Apply a partial update
    pub fn apply(&mut self, patch: &EffectsPatch) {
        if let Some(v) = patch.blur {
            self.blur = v;
        }
        if let Some(v) = patch.brightness {
            self.brightness = v;
        }
        if let Some(v) = patch.contrast {
            self.contrast = v;
        }
        if let Some(v) = patch.hue_rotate {
            self.hue_rotate = v;
        }
        if let Some(v) = patch.saturate {
            self.saturate = v;
        }
    }
}

/// Partial update for [`GlobalEffects`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EffectsPatch {
    /// Blur px
    pub blur: Option<f32>,
    /// Brightness %
    pub brightness: Option<f32>,
    /// Contrast %
    pub contrast: Option<f32>,
    /// Hue rotation deg
    pub hue_rotate: Option<f32>,
    /// Saturation %
    pub saturate: Option<f32>,
}

/// Shapes, layers and effects. Layer array order is z-order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectState {
    /// All shapes
    pub shapes: Vec<Shape>,
    /// One layer per shape, bottom to top
    pub layers: Vec<Layer>,
    /// Global post-processing
    pub effects: GlobalEffects,
}

impl ProjectState {
    /// The project a new session starts with
    pub fn initial() -> Self {
        let square = ShapeGeometry::Polygon(vec![
            Vec2::new(150.0, 150.0),
            Vec2::new(350.0, 150.0),
            Vec2::new(350.0, 350.0),
            Vec2::new(150.0, 350.0),
        ]);
        let triangle = ShapeGeometry::Polygon(vec![
            Vec2::new(450.0, 200.0),
            Vec2::new(650.0, 200.0),
            Vec2::new(550.0, 400.0),
        ]);
        Self {
            shapes: vec![
                Shape::new(1, square, Visual::generative(VisualId::GradientPurple)),
                Shape::new(2, triangle, Visual::generative(VisualId::Grid)),
            ],
            layers: vec![
                Layer::new(3, 1, "Main Square").with_color(layer_color(0)),
                Layer::new(4, 2, "Accent Triangle")
                    .with_opacity(0.8)
                    .with_blend_mode(BlendMode::Screen)
                    .with_color(layer_color(1)),
            ],
            effects: GlobalEffects::default(),
        }
    }

    /// Look up a shape
    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    /// Look up a shape mutably
    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    /// Look up a layer
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Look up a layer mutably
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Z-index of a layer
    pub fn layer_index(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// The layer that composites `shape_id`
    pub fn layer_for_shape(&self, shape_id: ShapeId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.shape_id == shape_id)
    }

    /// The shape behind a layer
    pub fn shape_for_layer(&self, layer_id: LayerId) -> Option<&Shape> {
        self.layer(layer_id).and_then(|l| self.shape(l.shape_id))
    }

    /// Largest id used by any shape or layer
    pub fn max_id(&self) -> u64 {
        self.shapes
            .iter()
            .map(|s| s.id)
            .chain(self.layers.iter().map(|l| l.id))
            .max()
            .unwrap_or(0)
    }

    /// Check the 1:1 shape/layer pairing
    pub fn validate(&self) -> Result<()> {
        let shape_ids: HashSet<ShapeId> = self.shapes.iter().map(|s| s.id).collect();
        let mut paired = HashSet::new();
        for layer in &self.layers {
            if !shape_ids.contains(&layer.shape_id) {
                return Err(CoreError::ShapeNotFound(layer.shape_id));
            }
            if !paired.insert(layer.shape_id) {
                return Err(CoreError::InvalidGeometry(format!(
                    "shape {} has more than one layer",
                    layer.shape_id
                )));
            }
        }
        if let Some(orphan) = self.shapes.iter().find(|s| !paired.contains(&s.id)) {
            return Err(CoreError::LayerNotFound(orphan.id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_project() {
        let state = ProjectState::initial();
        assert_eq!(state.shapes.len(), 2);
        assert_eq!(state.layers[0].name, "Main Square");
        assert_eq!(state.layers[1].blend_mode, BlendMode::Screen);
        assert_eq!(state.layers[1].opacity, 0.8);
        assert_eq!(state.max_id(), 4);
        state.validate().unwrap();
    }

    #[test]
    fn test_css_filter() {
        let effects = GlobalEffects {
            blur: 2.5,
            hue_rotate: 90.0,
            ..Default::default()
        };
        assert_eq!(
            effects.css_filter(),
            "blur(2.5px) brightness(100%) contrast(100%) hue-rotate(90deg) saturate(100%)"
        );
        assert!(GlobalEffects::default().is_identity());
    }

    #[test]
    fn test_effects_patch() {
        let mut effects = GlobalEffects::default();
        effects.apply(&EffectsPatch {
            contrast: Some(140.0),
            ..Default::default()
        });
        assert_eq!(effects.contrast, 140.0);
        assert_eq!(effects.brightness, 100.0);
    }

    #[test]
    fn test_validate_detects_orphans() {
        let mut state = ProjectState::initial();
        state.layers.pop();
        assert!(matches!(state.validate(), Err(CoreError::LayerNotFound(2))));

        let mut state = ProjectState::initial();
        state.shapes.pop();
        assert!(matches!(state.validate(), Err(CoreError::ShapeNotFound(2))));
    }

    #[test]
    fn test_effects_serde_is_camel_case() {
        let json = serde_json::to_value(GlobalEffects::default()).unwrap();
        assert_eq!(json["hueRotate"], 0.0);
    }
}
