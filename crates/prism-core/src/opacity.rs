//! Dynamic opacity evaluation
//!
//! A layer's effective opacity is recomputed every frame from its mode. No
//! state carries across frames or mode switches.

use crate::audio::AudioLevels;
use crate::layer::Layer;
use serde::{Deserialize, Serialize};

/// Default pulse speed (radians per second)
pub const DEFAULT_PULSE_SPEED: f32 = 1.0;
/// Default lower bound, 0-100
pub const DEFAULT_MIN: f32 = 0.0;
/// Default upper bound, 0-100
pub const DEFAULT_MAX: f32 = 100.0;
/// Default audio sensitivity multiplier
pub const DEFAULT_SENSITIVITY: f32 = 1.0;

/// How a layer's effective opacity is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OpacityMode {
    /// Layer opacity as-is
    #[default]
    Static,
    /// Sine oscillation between min and max
    Pulse,
    /// Driven by the bass level
    AudioBass,
    /// Driven by the mids level
    AudioMids,
    /// Driven by the highs level
    AudioHighs,
}

impl OpacityMode {
    /// List all modes
    pub fn all() -> &'static [OpacityMode] {
        &[
            OpacityMode::Static,
            OpacityMode::Pulse,
            OpacityMode::AudioBass,
            OpacityMode::AudioMids,
            OpacityMode::AudioHighs,
        ]
    }
}

/// Dynamic opacity parameters; unset fields use evaluator defaults
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OpacityParams {
    /// Pulse speed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    /// Lower bound, 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f32>,
    /// Upper bound, 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f32>,
    /// Audio level multiplier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<f32>,
}

impl OpacityParams {
    /// Set fields of `self` over `base`
    pub fn merged_over(&self, base: &OpacityParams) -> OpacityParams {
        OpacityParams {
            speed: self.speed.or(base.speed),
            min: self.min.or(base.min),
            max: self.max.or(base.max),
            sensitivity: self.sensitivity.or(base.sensitivity),
        }
    }

    /// Pulse speed or default
    pub fn speed(&self) -> f32 {
        self.speed.unwrap_or(DEFAULT_PULSE_SPEED)
    }

    /// Lower bound normalized to 0-1
    pub fn min_unit(&self) -> f64 {
        f64::from(self.min.unwrap_or(DEFAULT_MIN)) / 100.0
    }

    /// Upper bound normalized to 0-1
    pub fn max_unit(&self) -> f64 {
        f64::from(self.max.unwrap_or(DEFAULT_MAX)) / 100.0
    }

    /// Sensitivity or default
    pub fn sensitivity(&self) -> f32 {
        self.sensitivity.unwrap_or(DEFAULT_SENSITIVITY)
    }
}

/// Pulse opacity at `time_ms`. `min > max` yields an inverted range.
pub fn pulse(params: &OpacityParams, time_ms: f64) -> f32 {
    let (min, max) = (params.min_unit(), params.max_unit());
    let phase = time_ms * 0.001 * f64::from(params.speed());
    (min + (max - min) * 0.5 * (1.0 + phase.sin())) as f32
}

/// Audio-reactive opacity for a 0-100 `level`. `min > max` yields an
/// inverted range.
pub fn audio_reactive(params: &OpacityParams, level: f32) -> f32 {
    let (min, max) = (params.min_unit(), params.max_unit());
    let drive = (f64::from(level) / 100.0 * f64::from(params.sensitivity())).clamp(0.0, 1.0);
    (min + (max - min) * drive) as f32
}

/// Effective opacity of `layer` for this frame
pub fn effective_opacity(layer: &Layer, time_ms: f64, levels: &AudioLevels) -> f32 {
    let params = &layer.opacity_params;
    match layer.opacity_mode {
        OpacityMode::Static => layer.opacity,
        OpacityMode::Pulse => pulse(params, time_ms),
        OpacityMode::AudioBass => audio_reactive(params, levels.bass),
        OpacityMode::AudioMids => audio_reactive(params, levels.mids),
        OpacityMode::AudioHighs => audio_reactive(params, levels.highs),
    }
}
