//! Per-frame render composition
//!
//! [`Compositor::tick`] turns the project state, the session media and the
//! current audio frame into an ordered list of draw operations. Everything a
//! backend needs to draw a layer is resolved here: clip outline, transform,
//! effective opacity, blend mode and a fully parameterized fill. The global
//! effects are carried alongside and applied over the composed result.

use crate::audio::{AudioFrame, AudioLevels};
use crate::geometry::{Bounds, Outline, Shape, ShapeId};
use crate::layer::{BlendMode, LayerId};
use crate::media::{LiveStreamId, MediaLibrary, MediaType};
use crate::opacity::effective_opacity;
use crate::settings::StrobeSettings;
use crate::state::{GlobalEffects, ProjectState};
use crate::visual::{resolve_option, Visual, VisualCategory, VisualId};
use glam::{Affine2, Vec2};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

/// Added to dunes `frequencyY` at full mids
pub const DUNES_MIDS_GAIN: f32 = 0.2;
/// Added to caustics displacement `scale` at full highs
pub const CAUSTICS_HIGHS_GAIN: f32 = 30.0;
/// Added to particles `frequency` at full bass
pub const PARTICLES_BASS_GAIN: f32 = 0.5;
/// Added to mad-noise `frequency` at full bass
pub const MAD_NOISE_BASS_GAIN: f32 = 0.05;

/// How a layer's clipped region is filled
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Fill {
    /// Uploaded image or video drawn into `rect` (cover-scaled)
    Media {
        /// Media url
        url: String,
        /// Image or video, when the item is known
        media_type: Option<MediaType>,
        /// Destination rect in local space
        rect: Bounds,
    },
    /// Live camera frame drawn into `rect` (cover-scaled)
    LiveStream {
        /// Stream id
        stream_id: LiveStreamId,
        /// Destination rect in local space
        rect: Bounds,
    },
    /// Registry-backed filter or pattern with resolved, audio-modulated params
    Generative {
        /// Visual id
        visual: VisualId,
        /// Every registry parameter, resolved for this frame
        params: BTreeMap<String, f32>,
    },
    /// Fixed pattern or gradient
    Static {
        /// Visual id
        visual: VisualId,
    },
    /// Frequency bars (0-1) laid out across `rect`
    Spectrum {
        /// Bar heights
        bars: Vec<f32>,
        /// Local bounds of the shape
        rect: Bounds,
    },
    /// Time-domain polyline in local space
    Waveform {
        /// Polyline vertices
        points: Vec<Vec2>,
    },
    /// White flash at `alpha`
    Strobe {
        /// Flash alpha, 0-1
        alpha: f32,
    },
    /// Nothing to draw (e.g. the referenced stream has ended)
    Empty,
}

/// Everything needed to draw one layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderOp {
    /// Layer being drawn
    pub layer_id: LayerId,
    /// Shape behind the layer
    pub shape_id: ShapeId,
    /// Clip region in local space
    pub clip: Outline,
    /// Local-to-canvas transform (rotation and scale about the centroid)
    pub transform: Affine2,
    /// Effective opacity for this frame
    pub opacity: f32,
    /// Compositing operator
    pub blend_mode: BlendMode,
    /// Fill source
    pub fill: Fill,
}

/// Composed output for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    /// Frame time
    pub time_ms: f64,
    /// Draw operations, bottom to top
    pub ops: Vec<RenderOp>,
    /// Global adjustments over the composed output
    pub effects: GlobalEffects,
    /// Band levels the frame was composed with
    pub levels: AudioLevels,
}

impl RenderFrame {
    /// CSS filter string for the global effects
    pub fn filter(&self) -> String {
        self.effects.css_filter()
    }
}

#[derive(Debug, Clone, Copy)]
struct StrobeEnvelope {
    alpha: f32,
    last_time: f64,
}

/// Per-frame compositor. Holds only the strobe envelopes; everything else
/// is recomputed from scratch each tick.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    strobe: StrobeSettings,
    envelopes: HashMap<LayerId, StrobeEnvelope>,
}

impl Compositor {
    /// Create a compositor
    pub fn new(strobe: StrobeSettings) -> Self {
        Self {
            strobe,
            envelopes: HashMap::new(),
        }
    }

    /// Compose the frame at `time_ms`
    pub fn tick(
        &mut self,
        state: &ProjectState,
        media: &MediaLibrary,
        time_ms: f64,
        audio: &AudioFrame,
    ) -> RenderFrame {
        let levels = audio.levels;
        let mut ops = Vec::with_capacity(state.layers.len());

        for layer in state.layers.iter().filter(|l| l.visible) {
            let Some(shape) = state.shape(layer.shape_id) else {
                trace!("Layer {} references missing shape {}", layer.id, layer.shape_id);
                continue;
            };
            let fill = match shape.visual.category() {
                VisualCategory::Strobe => Fill::Strobe {
                    alpha: self.strobe_alpha(layer.id, time_ms, levels.bass),
                },
                _ => fill_for(shape, media, audio),
            };
            ops.push(RenderOp {
                layer_id: layer.id,
                shape_id: shape.id,
                clip: shape.geometry.outline(),
                transform: shape.transform(),
                opacity: effective_opacity(layer, time_ms, &levels),
                blend_mode: layer.blend_mode,
                fill,
            });
        }

        // Forget envelopes of layers that no longer strobe
        self.envelopes.retain(|id, _| {
            state.layer(*id).is_some_and(|l| {
                state
                    .shape(l.shape_id)
                    .is_some_and(|s| s.visual.category() == VisualCategory::Strobe)
            })
        });

        trace!("Frame {:.1}ms: {} ops", time_ms, ops.len());

        RenderFrame {
            time_ms,
            ops,
            effects: state.effects,
            levels,
        }
    }

    /// Move the layer's strobe alpha toward on/off, fading over `fade_ms`
    fn strobe_alpha(&mut self, layer_id: LayerId, time_ms: f64, bass: f32) -> f32 {
        let target = if bass > self.strobe.threshold { 1.0 } else { 0.0 };
        let envelope = self.envelopes.entry(layer_id).or_insert(StrobeEnvelope {
            alpha: 0.0,
            last_time: time_ms,
        });
        let dt = (time_ms - envelope.last_time).max(0.0);
        let step = if self.strobe.fade_ms <= 0.0 {
            1.0
        } else {
            (dt / self.strobe.fade_ms) as f32
        };
        envelope.alpha = if target > envelope.alpha {
            (envelope.alpha + step).min(target)
        } else {
            (envelope.alpha - step).max(target)
        };
        envelope.last_time = time_ms;
        envelope.alpha
    }
}

/// Fill for every category except strobe
fn fill_for(shape: &Shape, media: &MediaLibrary, audio: &AudioFrame) -> Fill {
    let bounds = shape.geometry.bounds();
    match &shape.visual {
        Visual::Media { url } => {
            let item = media.item_by_url(url);
            let rect = item
                .and_then(|i| i.size)
                .map(|size| bounds.cover(size))
                .unwrap_or(bounds);
            Fill::Media {
                url: url.clone(),
                media_type: item.map(|i| i.media_type),
                rect,
            }
        }
        Visual::LiveInput { stream_id } => match media.stream(*stream_id) {
            Some(stream) => Fill::LiveStream {
                stream_id: *stream_id,
                rect: bounds.cover(stream.size),
            },
            None => Fill::Empty,
        },
        Visual::Generative { id } => match id.category() {
            VisualCategory::Parameterized => Fill::Generative {
                visual: *id,
                params: modulated_params(shape, *id, &audio.levels),
            },
            VisualCategory::Spectrum => Fill::Spectrum {
                bars: audio.spectrum.clone(),
                rect: bounds,
            },
            VisualCategory::Waveform => Fill::Waveform {
                points: waveform_points(&audio.waveform, bounds),
            },
            _ => Fill::Static { visual: *id },
        },
    }
}

/// Resolve every registry parameter of `visual` on `shape`, then add the
/// audio coupling
pub fn modulated_params(
    shape: &Shape,
    visual: VisualId,
    levels: &AudioLevels,
) -> BTreeMap<String, f32> {
    let mut params: BTreeMap<String, f32> = visual
        .params()
        .map(|table| {
            table
                .keys()
                .map(|key| (key.to_string(), resolve_option(shape, key)))
                .collect()
        })
        .unwrap_or_default();

    let (key, gain, level) = match visual {
        VisualId::Dunes => ("frequencyY", DUNES_MIDS_GAIN, levels.mids),
        VisualId::Caustics => ("scale", CAUSTICS_HIGHS_GAIN, levels.highs),
        VisualId::Particles => ("frequency", PARTICLES_BASS_GAIN, levels.bass),
        VisualId::MadNoise => ("frequency", MAD_NOISE_BASS_GAIN, levels.bass),
        _ => return params,
    };
    if let Some(value) = params.get_mut(key) {
        *value += level / 100.0 * gain;
    }
    params
}

/// Lay `samples` (-1..1) across `bounds`, centered vertically
fn waveform_points(samples: &[f32], bounds: Bounds) -> Vec<Vec2> {
    if samples.is_empty() {
        return Vec::new();
    }
    let size = bounds.size();
    let mid_y = bounds.center().y;
    let last = (samples.len() - 1).max(1) as f32;
    samples
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Vec2::new(
                bounds.min.x + size.x * i as f32 / last,
                mid_y - s.clamp(-1.0, 1.0) * size.y * 0.5,
            )
        })
        .collect()
}
