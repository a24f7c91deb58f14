//! Prism Core - Domain Model and Frame Composition
//!
//! This crate contains the core domain model for Prism, including:
//! - Shape geometry (polygon/rect/circle) with centroid-anchored transforms
//! - Layer system for compositing
//! - Visual catalogue and parameter registry
//! - Audio feed and spectrum analysis
//! - Dynamic opacity and per-frame render composition
//! - Pointer interaction, undo/redo history and the editor state container

#![warn(missing_docs)]

pub use glam::Vec2;
use thiserror::Error;

pub mod audio;
pub mod editor;
pub mod geometry;
pub mod history;
pub mod interaction;
pub mod layer;
pub mod logging;
pub mod media;
pub mod opacity;
pub mod render;
pub mod scene;
pub mod settings;
pub mod state;
pub mod suggest;
pub mod visual;

// --- Re-exports grouped by category ---

// Geometry & Layers
pub use geometry::{
    Bounds, Handle, Outline, Point, Shape, ShapeGeometry, ShapeId, ShapeKind, ShapePatch,
    VisualOptions,
};
pub use layer::{BlendMode, Layer, LayerId, LayerPatch, LAYER_COLORS};
pub use opacity::{effective_opacity, OpacityMode, OpacityParams};

// Visuals
pub use visual::{
    default_options, param_spec, resolve_option, ParamSpec, Visual, VisualCategory, VisualId,
};

// Audio System
pub use audio::{
    AudioFeed, AudioFrame, AudioLevelSource, AudioLevels, BandSplit, MicrophoneSource,
    SimulatedAudio, SpectrumAnalyzer, SpectrumAnalyzerConfig,
};

// Rendering
pub use render::{Compositor, Fill, RenderFrame, RenderOp};

// Editing
pub use editor::{Editor, Notice, NoticeLevel};
pub use history::History;
pub use interaction::{DragState, InteractionController, Overlay, PointerButton};
pub use scene::{Scene, SceneLibrary};
pub use state::{EffectsPatch, GlobalEffects, ProjectState};

// External collaborators
pub use media::{
    DeviceError, LiveStream, LiveStreamId, MediaItem, MediaLibrary, MediaType, VideoStreamSource,
};
pub use suggest::{
    parse_suggestion, Suggestion, SuggestionRequest, SuggestionWorker, VisualSuggester,
};

// Settings & Logging
pub use logging::LogConfig;
pub use settings::Settings;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid geometry configuration
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// No shape with this id
    #[error("Shape not found: {0}")]
    ShapeNotFound(ShapeId),

    /// No layer with this id
    #[error("Layer not found: {0}")]
    LayerNotFound(LayerId),

    /// No scene with this id
    #[error("Scene not found: {0}")]
    SceneNotFound(u64),

    /// Visual id outside the catalogue or registry
    #[error("Unknown visual: {0}")]
    UnknownVisual(String),

    /// Suggestion response could not be used
    #[error("Invalid suggestion: {0}")]
    InvalidSuggestion(String),

    /// Camera or microphone acquisition failed
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
