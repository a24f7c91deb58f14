//! Layer system for compositing shapes
//!
//! Each layer owns the compositing parameters of exactly one shape: opacity
//! (static or dynamically driven), blend mode and visibility. Array order of
//! the layer list is z-order, later layers drawn on top.

use crate::geometry::ShapeId;
use crate::opacity::{OpacityMode, OpacityParams};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a Layer
pub type LayerId = u64;

/// Accent colors assigned round-robin to new layers
pub const LAYER_COLORS: [&str; 8] = [
    "#ef4444", // red-500
    "#3b82f6", // blue-500
    "#22c55e", // green-500
    "#eab308", // yellow-500
    "#a855f7", // purple-500
    "#ec4899", // pink-500
    "#14b8a6", // teal-500
    "#f97316", // orange-500
];

/// Accent color for the layer created at `index`
pub fn layer_color(index: usize) -> &'static str {
    LAYER_COLORS[index % LAYER_COLORS.len()]
}

/// Blend mode for compositing layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Normal alpha blending (default)
    #[default]
    Normal,
    /// Multiply colors (darken)
    Multiply,
    /// Screen colors (lighten)
    Screen,
    /// Overlay (combination of multiply and screen)
    Overlay,
    /// Darken only (min)
    Darken,
    /// Lighten only (max)
    Lighten,
    /// Color dodge
    ColorDodge,
    /// Color burn
    ColorBurn,
    /// Hard light
    HardLight,
    /// Soft light
    SoftLight,
    /// Difference
    Difference,
    /// Exclusion
    Exclusion,
    /// Hue of source, saturation and luminosity of backdrop
    Hue,
    /// Saturation of source
    Saturation,
    /// Hue and saturation of source
    Color,
    /// Luminosity of source
    Luminosity,
}

impl BlendMode {
    /// Compositing operator name as used by CSS `mix-blend-mode`
    pub fn css_name(&self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::ColorDodge => "color-dodge",
            BlendMode::ColorBurn => "color-burn",
            BlendMode::HardLight => "hard-light",
            BlendMode::SoftLight => "soft-light",
            BlendMode::Difference => "difference",
            BlendMode::Exclusion => "exclusion",
            BlendMode::Hue => "hue",
            BlendMode::Saturation => "saturation",
            BlendMode::Color => "color",
            BlendMode::Luminosity => "luminosity",
        }
    }

    /// List all available blend modes
    pub fn all() -> &'static [BlendMode] {
        &[
            BlendMode::Normal,
            BlendMode::Multiply,
            BlendMode::Screen,
            BlendMode::Overlay,
            BlendMode::Darken,
            BlendMode::Lighten,
            BlendMode::ColorDodge,
            BlendMode::ColorBurn,
            BlendMode::HardLight,
            BlendMode::SoftLight,
            BlendMode::Difference,
            BlendMode::Exclusion,
            BlendMode::Hue,
            BlendMode::Saturation,
            BlendMode::Color,
            BlendMode::Luminosity,
        ]
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name())
    }
}

/// A single layer in the composition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Layer {
    /// Unique identifier for the layer
    pub id: LayerId,
    /// The shape this layer composites (1:1)
    pub shape_id: ShapeId,
    /// Display name of the layer
    pub name: String,
    /// Static opacity baseline - 0.0 = transparent, 1.0 = opaque
    pub opacity: f32,
    /// Blend mode for compositing
    pub blend_mode: BlendMode,
    /// Visibility state of the layer
    pub visible: bool,
    /// UI accent color
    pub color: String,
    /// How effective opacity is derived each frame
    #[serde(default)]
    pub opacity_mode: OpacityMode,
    /// Parameters for dynamic opacity modes
    #[serde(default)]
    pub opacity_params: OpacityParams,
}

impl Layer {
    /// Create a new layer for `shape_id`
    pub fn new(id: LayerId, shape_id: ShapeId, name: impl Into<String>) -> Self {
        Self {
            id,
            shape_id,
            name: name.into(),
            opacity: 1.0,
            blend_mode: BlendMode::default(),
            visible: true,
            color: LAYER_COLORS[0].to_string(),
            opacity_mode: OpacityMode::default(),
            opacity_params: OpacityParams::default(),
        }
    }

    /// Set blend mode
    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    /// Set opacity
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Set accent color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Rename the layer
    pub fn rename(&mut self, new_name: impl Into<String>) {
        self.name = new_name.into();
    }

    /// Apply a partial update
    pub fn apply(&mut self, patch: &LayerPatch) {
        if let Some(name) = &patch.name {
            self.rename(name.clone());
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity;
        }
        if let Some(blend_mode) = patch.blend_mode {
            self.blend_mode = blend_mode;
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
        if let Some(mode) = patch.opacity_mode {
            self.opacity_mode = mode;
        }
        if let Some(params) = &patch.opacity_params {
            self.opacity_params = params.merged_over(&self.opacity_params);
        }
    }
}

/// Partial update for a [`Layer`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerPatch {
    /// New name
    pub name: Option<String>,
    /// New static opacity
    pub opacity: Option<f32>,
    /// New blend mode
    pub blend_mode: Option<BlendMode>,
    /// New visibility
    pub visible: Option<bool>,
    /// New opacity mode
    pub opacity_mode: Option<OpacityMode>,
    /// Opacity params; set fields override, unset fields keep current values
    pub opacity_params: Option<OpacityParams>,
}

impl LayerPatch {
    /// Patch that sets static opacity
    pub fn opacity(opacity: f32) -> Self {
        Self {
            opacity: Some(opacity),
            ..Default::default()
        }
    }

    /// Patch that sets visibility
    pub fn visible(visible: bool) -> Self {
        Self {
            visible: Some(visible),
            ..Default::default()
        }
    }

    /// Patch that sets blend mode
    pub fn blend_mode(blend_mode: BlendMode) -> Self {
        Self {
            blend_mode: Some(blend_mode),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_mode_css_name() {
        assert_eq!(BlendMode::Normal.css_name(), "normal");
        assert_eq!(BlendMode::ColorDodge.css_name(), "color-dodge");
        assert_eq!(BlendMode::Luminosity.css_name(), "luminosity");
        assert_eq!(BlendMode::all().len(), 16);
    }

    #[test]
    fn test_blend_mode_serde_matches_css() {
        for mode in BlendMode::all() {
            let json = serde_json::to_string(mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.css_name()));
        }
    }

    #[test]
    fn test_layer_creation() {
        let layer = Layer::new(1, 10, "Test Layer")
            .with_blend_mode(BlendMode::Multiply)
            .with_opacity(1.5);

        assert_eq!(layer.id, 1);
        assert_eq!(layer.shape_id, 10);
        assert_eq!(layer.blend_mode, BlendMode::Multiply);
        assert_eq!(layer.opacity, 1.0);
        assert!(layer.visible);
        assert_eq!(layer.opacity_mode, OpacityMode::Static);
    }

    #[test]
    fn test_layer_color_round_robin() {
        assert_eq!(layer_color(0), "#ef4444");
        assert_eq!(layer_color(8), "#ef4444");
        assert_eq!(layer_color(9), "#3b82f6");
    }

    #[test]
    fn test_patch_merges_only_set_fields() {
        let mut layer = Layer::new(1, 1, "A").with_opacity(0.4);
        layer.apply(&LayerPatch::visible(false));
        assert!(!layer.visible);
        assert_eq!(layer.opacity, 0.4);
        assert_eq!(layer.name, "A");
    }

    #[test]
    fn test_patch_merges_opacity_params() {
        let mut layer = Layer::new(1, 1, "A");
        layer.opacity_params.speed = Some(3.0);
        layer.apply(&LayerPatch {
            opacity_params: Some(OpacityParams {
                min: Some(20.0),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(layer.opacity_params.speed, Some(3.0));
        assert_eq!(layer.opacity_params.min, Some(20.0));
    }
}
