//! Visual catalogue and parameter registry
//!
//! Every generative visual has a stable string id. Visuals with tunable
//! parameters are described declaratively (label, range, step, default) in a
//! static registry; the rest are fixed patterns or audio displays.

use crate::geometry::{Shape, VisualOptions};
use crate::media::LiveStreamId;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Identifier of a built-in generative visual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualId {
    /// Smooth color gradient
    GradientColor,
    /// Bass-gated strobe flash
    #[serde(rename = "strob")]
    Strobe,
    /// Scattered primitive shapes
    Shapes,
    /// Parallel stroked lines
    LinePatterns,
    /// Displaced turbulence, bass-driven
    MadNoise,
    /// Shaded sphere
    Sphere,
    /// Repeated lines
    LineRepeat,
    /// Square grid array
    SquareArray,
    /// Rotating siren sweep
    Siren,
    /// Stretched turbulence, mids-driven
    Dunes,
    /// Barcode stripes
    BarCode,
    /// Brick pattern
    Bricks,
    /// Soft turbulence
    Clouds,
    /// Random noise
    Random,
    /// Noisy barcode stripes
    NoisyBarcode,
    /// Displaced turbulence, highs-driven
    Caustics,
    /// Square wave bands
    SquareWave,
    /// Concentric cubic circles
    CubicCircles,
    /// Diagonal stripes
    Diagonals,
    /// Live frequency bars
    Spectrum,
    /// Live time-domain polyline
    Waveform,
    /// Dot matrix pattern
    Dots,
    /// Grid lines pattern
    Grid,
    /// Fractal noise
    Fractal,
    /// Particle noise, bass-driven
    Particles,
    /// Radial purple gradient
    GradientPurple,
    /// Radial blue gradient
    GradientBlue,
}

impl VisualId {
    /// All visuals in catalogue order
    pub fn all() -> &'static [VisualId] {
        use VisualId::*;
        &[
            GradientColor,
            Strobe,
            Shapes,
            LinePatterns,
            MadNoise,
            Sphere,
            LineRepeat,
            SquareArray,
            Siren,
            Dunes,
            BarCode,
            Bricks,
            Clouds,
            Random,
            NoisyBarcode,
            Caustics,
            SquareWave,
            CubicCircles,
            Diagonals,
            Spectrum,
            Waveform,
            Dots,
            Grid,
            Fractal,
            Particles,
            GradientPurple,
            GradientBlue,
        ]
    }

    /// Stable string id
    pub fn as_str(&self) -> &'static str {
        use VisualId::*;
        match self {
            GradientColor => "gradient-color",
            Strobe => "strob",
            Shapes => "shapes",
            LinePatterns => "line-patterns",
            MadNoise => "mad-noise",
            Sphere => "sphere",
            LineRepeat => "line-repeat",
            SquareArray => "square-array",
            Siren => "siren",
            Dunes => "dunes",
            BarCode => "bar-code",
            Bricks => "bricks",
            Clouds => "clouds",
            Random => "random",
            NoisyBarcode => "noisy-barcode",
            Caustics => "caustics",
            SquareWave => "square-wave",
            CubicCircles => "cubic-circles",
            Diagonals => "diagonals",
            Spectrum => "spectrum",
            Waveform => "waveform",
            Dots => "dots",
            Grid => "grid",
            Fractal => "fractal",
            Particles => "particles",
            GradientPurple => "gradient-purple",
            GradientBlue => "gradient-blue",
        }
    }

    /// Display name
    pub fn display_name(&self) -> &'static str {
        use VisualId::*;
        match self {
            GradientColor => "Gradient Color",
            Strobe => "Strob",
            Shapes => "Shapes",
            LinePatterns => "Line Patterns",
            MadNoise => "MadNoise",
            Sphere => "Sphere",
            LineRepeat => "LineRepeat",
            SquareArray => "SquareArray",
            Siren => "Siren",
            Dunes => "Dunes",
            BarCode => "Bar Code",
            Bricks => "Bricks",
            Clouds => "Clouds",
            Random => "Random",
            NoisyBarcode => "Noisy Barcode",
            Caustics => "Caustics",
            SquareWave => "SquareWave",
            CubicCircles => "CubicCircles",
            Diagonals => "Diagonals",
            Spectrum => "Spectrum",
            Waveform => "Waveform",
            Dots => "Dots",
            Grid => "Grid",
            Fractal => "Fractal",
            Particles => "Particles",
            GradientPurple => "Purple Haze",
            GradientBlue => "Blue Plasma",
        }
    }

    /// Rendering category
    pub fn category(&self) -> VisualCategory {
        match self {
            VisualId::Spectrum => VisualCategory::Spectrum,
            VisualId::Waveform => VisualCategory::Waveform,
            VisualId::Strobe => VisualCategory::Strobe,
            id if REGISTRY.contains_key(id) => VisualCategory::Parameterized,
            _ => VisualCategory::Static,
        }
    }

    /// Parameter specs, if this visual is tunable
    pub fn params(&self) -> Option<&'static ParamTable> {
        REGISTRY.get(self)
    }
}

impl fmt::Display for VisualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisualId {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VisualId::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| crate::CoreError::UnknownVisual(s.to_string()))
    }
}

/// How a visual is turned into pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualCategory {
    /// Uploaded image/video
    Media,
    /// Live camera stream
    LiveInput,
    /// Registry-backed filter or pattern
    Parameterized,
    /// Fixed pattern or gradient
    Static,
    /// Frequency bar chart
    Spectrum,
    /// Time-domain polyline
    Waveform,
    /// Bass-gated flash
    Strobe,
}

/// Fill source of a shape. Media and live input exclude generative
/// visuals and each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum Visual {
    /// Built-in generative visual
    Generative {
        /// Visual id
        id: VisualId,
    },
    /// Uploaded media referenced by url
    Media {
        /// Media url
        url: String,
    },
    /// Live camera stream referenced by id
    LiveInput {
        /// Stream id
        stream_id: LiveStreamId,
    },
}

impl Visual {
    /// Generative visual shorthand
    pub fn generative(id: VisualId) -> Self {
        Visual::Generative { id }
    }

    /// Rendering category
    pub fn category(&self) -> VisualCategory {
        match self {
            Visual::Generative { id } => id.category(),
            Visual::Media { .. } => VisualCategory::Media,
            Visual::LiveInput { .. } => VisualCategory::LiveInput,
        }
    }

    /// Generative id, if any
    pub fn visual_id(&self) -> Option<VisualId> {
        match self {
            Visual::Generative { id } => Some(*id),
            _ => None,
        }
    }
}

/// Declarative description of one tunable parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamSpec {
    /// UI label
    pub label: &'static str,
    /// Minimum value
    pub min: f32,
    /// Maximum value
    pub max: f32,
    /// Slider step
    pub step: f32,
    /// Default value
    pub default_value: f32,
}

impl ParamSpec {
    const fn new(label: &'static str, min: f32, max: f32, step: f32, default_value: f32) -> Self {
        Self {
            label,
            min,
            max,
            step,
            default_value,
        }
    }

    /// Clamp `value` into the declared range
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

/// Parameter name to spec, in stable order
pub type ParamTable = BTreeMap<&'static str, ParamSpec>;

static REGISTRY: Lazy<BTreeMap<VisualId, ParamTable>> = Lazy::new(|| {
    use VisualId::*;
    let table = |entries: &[(&'static str, ParamSpec)]| -> ParamTable {
        entries.iter().cloned().collect()
    };
    let mut registry = BTreeMap::new();
    registry.insert(
        Dunes,
        table(&[
            ("frequencyX", ParamSpec::new("Frequency X", 0.01, 0.2, 0.005, 0.02)),
            ("frequencyY", ParamSpec::new("Frequency Y", 0.05, 0.8, 0.01, 0.2)),
            ("octaves", ParamSpec::new("Octaves", 1.0, 5.0, 1.0, 2.0)),
        ]),
    );
    registry.insert(
        Clouds,
        table(&[
            ("frequency", ParamSpec::new("Frequency", 0.005, 0.1, 0.001, 0.03)),
            ("octaves", ParamSpec::new("Octaves", 1.0, 8.0, 1.0, 4.0)),
        ]),
    );
    registry.insert(
        Caustics,
        table(&[
            ("frequency", ParamSpec::new("Frequency", 0.01, 0.2, 0.005, 0.05)),
            ("octaves", ParamSpec::new("Octaves", 1.0, 5.0, 1.0, 3.0)),
            ("scale", ParamSpec::new("Displacement", 1.0, 50.0, 1.0, 15.0)),
        ]),
    );
    registry.insert(
        Fractal,
        table(&[
            ("frequency", ParamSpec::new("Frequency", 0.01, 0.1, 0.001, 0.04)),
            ("octaves", ParamSpec::new("Octaves", 1.0, 8.0, 1.0, 4.0)),
        ]),
    );
    registry.insert(
        Particles,
        table(&[("frequency", ParamSpec::new("Size", 0.1, 2.0, 0.05, 0.9))]),
    );
    registry.insert(
        MadNoise,
        table(&[
            ("frequency", ParamSpec::new("Frequency", 0.01, 0.1, 0.001, 0.02)),
            ("scale", ParamSpec::new("Displacement", 1.0, 50.0, 1.0, 20.0)),
        ]),
    );
    registry.insert(
        Grid,
        table(&[
            ("size", ParamSpec::new("Size", 5.0, 100.0, 1.0, 20.0)),
            ("strokeWidth", ParamSpec::new("Stroke Width", 0.1, 5.0, 0.1, 0.5)),
        ]),
    );
    registry.insert(
        Dots,
        table(&[
            ("size", ParamSpec::new("Spacing", 5.0, 50.0, 1.0, 10.0)),
            ("radius", ParamSpec::new("Radius", 0.5, 10.0, 0.5, 1.0)),
        ]),
    );
    registry.insert(
        LinePatterns,
        table(&[
            ("spacing", ParamSpec::new("Spacing", 4.0, 40.0, 1.0, 10.0)),
            ("strokeWidth", ParamSpec::new("Stroke Width", 0.5, 10.0, 0.5, 2.0)),
        ]),
    );
    registry
});

/// Visuals that have registry entries, in id order
pub fn parameterized_visuals() -> impl Iterator<Item = (VisualId, &'static ParamTable)> {
    REGISTRY.iter().map(|(id, table)| (*id, table))
}

/// Spec for `key` on `visual`, if registered
pub fn param_spec(visual: VisualId, key: &str) -> Option<&'static ParamSpec> {
    REGISTRY.get(&visual).and_then(|table| table.get(key))
}

/// Fully populated options using only registry defaults.
///
/// Visuals without registry entries (and media/live sources) get an empty map.
pub fn default_options(visual: &Visual) -> VisualOptions {
    visual
        .visual_id()
        .and_then(|id| REGISTRY.get(&id))
        .map(|table| {
            table
                .iter()
                .map(|(key, spec)| (key.to_string(), spec.default_value))
                .collect()
        })
        .unwrap_or_default()
}

/// Effective value of `key` on `shape`: explicit option, then registry
/// default, then 0.
pub fn resolve_option(shape: &Shape, key: &str) -> f32 {
    if let Some(value) = shape.visual_options.get(key) {
        return *value;
    }
    shape
        .visual
        .visual_id()
        .and_then(|id| param_spec(id, key))
        .map(|spec| spec.default_value)
        .unwrap_or(0.0)
}
