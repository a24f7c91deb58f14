//! Editor state container
//!
//! [`Editor`] owns the undo history (whose current snapshot *is* the project),
//! the selection, the session media and scenes, and the queue of user-visible
//! notices. Every project mutation goes through [`Editor::set_state`] with an
//! explicit commit flag.
//!
//! Continuous gestures (pointer drags, slider scrubs) are bracketed by
//! [`Editor::begin_gesture`] and [`Editor::end_gesture`]: intermediate updates
//! are drafts that overwrite the current snapshot, and ending the gesture
//! turns the net change into exactly one history entry.

use crate::audio::{AudioFeed, AudioFrame, MicrophoneSource};
use crate::geometry::{Point, Shape, ShapeGeometry, ShapeId, ShapeKind, ShapePatch};
use crate::history::History;
use crate::layer::{layer_color, Layer, LayerId, LayerPatch};
use crate::media::{DeviceError, MediaLibrary, VideoStreamSource};
use crate::render::{Compositor, RenderFrame};
use crate::scene::{SceneId, SceneLibrary};
use crate::settings::{AudioSettings, Settings};
use crate::state::{EffectsPatch, ProjectState};
use crate::suggest::parse_suggestion;
use crate::visual::{Visual, VisualId};
use crate::{CoreError, Result, Vec2};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Severity of a [`Notice`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational
    Info,
    /// Recoverable failure
    Warning,
    /// Operation failed
    Error,
}

/// A user-visible alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Message text
    pub message: String,
}

/// Geometry of the rect created for uploads and camera streams
fn media_rect() -> ShapeGeometry {
    ShapeGeometry::rect(Vec2::new(150.0, 150.0), Vec2::new(450.0, 350.0))
}

/// Default visual for newly created shapes of `kind`
pub fn default_visual(kind: ShapeKind) -> Visual {
    match kind {
        ShapeKind::Rect => Visual::generative(VisualId::GradientBlue),
        ShapeKind::Circle => Visual::generative(VisualId::GradientPurple),
        ShapeKind::Polygon => Visual::generative(VisualId::Grid),
    }
}

/// The explicit state container for a running session
pub struct Editor {
    history: History,
    selected_layer: Option<LayerId>,
    selected_point: Option<usize>,
    next_id: u64,
    gesture_anchor: Option<ProjectState>,
    scenes: SceneLibrary,
    media: MediaLibrary,
    notices: VecDeque<Notice>,
    compositor: Compositor,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl Editor {
    /// Start a session from the initial project
    pub fn new(settings: &Settings) -> Self {
        let mut editor = Self::with_state(ProjectState::initial());
        if let Some(limit) = settings.history_limit {
            editor.history = editor.history.with_limit(limit);
        }
        editor.compositor = Compositor::new(settings.strobe);
        editor
    }

    /// Start a session from `state`; the first layer is selected
    pub fn with_state(state: ProjectState) -> Self {
        let next_id = state.max_id() + 1;
        let selected_layer = state.layers.first().map(|l| l.id);
        Self {
            history: History::new(state),
            selected_layer,
            selected_point: None,
            next_id,
            gesture_anchor: None,
            scenes: SceneLibrary::new(),
            media: MediaLibrary::new(),
            notices: VecDeque::new(),
            compositor: Compositor::default(),
        }
    }

    /// Current project
    pub fn state(&self) -> &ProjectState {
        self.history.current()
    }

    /// Undo history
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Session media
    pub fn media(&self) -> &MediaLibrary {
        &self.media
    }

    /// Saved scenes
    pub fn scenes(&self) -> &SceneLibrary {
        &self.scenes
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Replace the project. A draft (`commit == false`) overwrites the
    /// current snapshot; a commit appends. Returns whether anything changed.
    ///
    /// A commit during a gesture first closes the gesture so far as its own
    /// entry, then reopens it on top of the commit.
    pub fn set_state(&mut self, next: ProjectState, commit: bool) -> bool {
        self.next_id = self.next_id.max(next.max_id() + 1);
        let resume = commit && self.gesture_active();
        if resume {
            self.end_gesture();
        }
        let changed = self.history.set_state(next, commit);
        if resume {
            self.begin_gesture();
        }
        if changed {
            self.reconcile_selection();
        }
        changed
    }

    fn mutate<F>(&mut self, commit: bool, f: F) -> Result<bool>
    where
        F: FnOnce(&mut ProjectState) -> Result<()>,
    {
        let mut next = self.state().clone();
        f(&mut next)?;
        Ok(self.set_state(next, commit))
    }

    /// Step back in history; silent no-op at the oldest entry and while a
    /// gesture is in progress
    pub fn undo(&mut self) -> bool {
        if self.gesture_active() {
            debug!("Undo ignored during gesture");
            return false;
        }
        let moved = self.history.undo();
        if moved {
            self.reconcile_selection();
        }
        moved
    }

    /// Step forward in history; silent no-op at the newest entry and while
    /// a gesture is in progress
    pub fn redo(&mut self) -> bool {
        if self.gesture_active() {
            debug!("Redo ignored during gesture");
            return false;
        }
        let moved = self.history.redo();
        if moved {
            self.reconcile_selection();
        }
        moved
    }

    /// Keep the selection pointing at something that exists
    fn reconcile_selection(&mut self) {
        let state = self.history.current();
        let valid = self
            .selected_layer
            .is_some_and(|id| state.layer(id).is_some());
        if !valid {
            let fallback = state.layers.first().map(|l| l.id);
            if self.selected_layer != fallback {
                debug!("Selection {:?} -> {:?}", self.selected_layer, fallback);
            }
            self.selected_layer = fallback;
            self.selected_point = None;
        }
        if let (Some(point), Some(shape)) = (self.selected_point, self.selected_shape()) {
            if point >= shape.geometry.handles().len() {
                self.selected_point = None;
            }
        }
    }

    // --- Gestures ---

    /// Remember the current snapshot as the start of a continuous edit
    pub fn begin_gesture(&mut self) {
        self.gesture_anchor = Some(self.state().clone());
    }

    /// True between `begin_gesture` and `end_gesture`
    pub fn gesture_active(&self) -> bool {
        self.gesture_anchor.is_some()
    }

    /// Commit the net change since `begin_gesture` as one history entry.
    /// Returns whether an entry was added.
    pub fn end_gesture(&mut self) -> bool {
        let Some(anchor) = self.gesture_anchor.take() else {
            return false;
        };
        if anchor == *self.state() {
            return false;
        }
        let last = self.state().clone();
        // Put the pre-gesture snapshot back under the cursor, then append
        self.history.set_state(anchor, false);
        let committed = self.history.set_state(last, true);
        self.reconcile_selection();
        committed
    }

    // --- Structure ---

    /// Create a paired shape and layer; the new layer becomes selected
    pub fn add_layer(
        &mut self,
        geometry: ShapeGeometry,
        visual: Visual,
        name: impl Into<String>,
    ) -> (ShapeId, LayerId) {
        let shape_id = self.allocate_id();
        let layer_id = self.allocate_id();
        let mut next = self.state().clone();
        let color = layer_color(next.layers.len());
        let layer = Layer::new(layer_id, shape_id, name).with_color(color);
        info!("Added layer '{}' (id={}, shape={})", layer.name, layer_id, shape_id);
        next.shapes.push(Shape::new(shape_id, geometry, visual));
        next.layers.push(layer);
        self.set_state(next, true);
        self.select_layer(Some(layer_id));
        (shape_id, layer_id)
    }

    /// Create a shape of `kind` with its default geometry and visual
    pub fn add_shape(&mut self, kind: ShapeKind) -> (ShapeId, LayerId) {
        self.add_layer(
            ShapeGeometry::default_for(kind),
            default_visual(kind),
            format!("{} Layer", kind.label()),
        )
    }

    /// Create a polygon from drawn vertices (at least three)
    pub fn add_polygon(&mut self, points: Vec<Point>) -> Result<(ShapeId, LayerId)> {
        let geometry = ShapeGeometry::polygon(points)?;
        Ok(self.add_layer(
            geometry,
            default_visual(ShapeKind::Polygon),
            format!("{} Layer", ShapeKind::Polygon.label()),
        ))
    }

    /// Remove a layer and its shape together
    pub fn delete_layer(&mut self, id: LayerId) -> Result<()> {
        self.mutate(true, |state| {
            let index = state.layer_index(id).ok_or(CoreError::LayerNotFound(id))?;
            let layer = state.layers.remove(index);
            state.shapes.retain(|s| s.id != layer.shape_id);
            info!("Deleted layer '{}' (id={}) with shape {}", layer.name, id, layer.shape_id);
            Ok(())
        })?;
        Ok(())
    }

    /// Remove a shape and its layer together
    pub fn delete_shape(&mut self, id: ShapeId) -> Result<()> {
        let layer_id = self
            .state()
            .layer_for_shape(id)
            .map(|l| l.id)
            .ok_or(CoreError::ShapeNotFound(id))?;
        self.delete_layer(layer_id)
    }

    /// Partial shape update
    pub fn update_shape(&mut self, id: ShapeId, patch: &ShapePatch, commit: bool) -> Result<bool> {
        self.mutate(commit, |state| {
            let shape = state.shape_mut(id).ok_or(CoreError::ShapeNotFound(id))?;
            shape.apply(patch);
            Ok(())
        })
    }

    /// Partial layer update
    pub fn update_layer(&mut self, id: LayerId, patch: &LayerPatch, commit: bool) -> Result<bool> {
        self.mutate(commit, |state| {
            let layer = state.layer_mut(id).ok_or(CoreError::LayerNotFound(id))?;
            layer.apply(patch);
            Ok(())
        })
    }

    /// Partial global effects update
    pub fn update_effects(&mut self, patch: &EffectsPatch, commit: bool) -> bool {
        let mut next = self.state().clone();
        next.effects.apply(patch);
        self.set_state(next, commit)
    }

    /// Move a layer one step toward the top. Returns false if already on top.
    pub fn move_layer_up(&mut self, id: LayerId) -> Result<bool> {
        self.mutate(true, |state| {
            let index = state.layer_index(id).ok_or(CoreError::LayerNotFound(id))?;
            if index + 1 < state.layers.len() {
                state.layers.swap(index, index + 1);
            }
            Ok(())
        })
    }

    /// Move a layer one step toward the bottom. Returns false if already
    /// at the bottom.
    pub fn move_layer_down(&mut self, id: LayerId) -> Result<bool> {
        self.mutate(true, |state| {
            let index = state.layer_index(id).ok_or(CoreError::LayerNotFound(id))?;
            if index > 0 {
                state.layers.swap(index, index - 1);
            }
            Ok(())
        })
    }

    // --- Selection ---

    /// Select a layer; choosing a different layer clears the point selection
    pub fn select_layer(&mut self, id: Option<LayerId>) {
        let id = id.filter(|id| self.state().layer(*id).is_some());
        if id != self.selected_layer {
            self.selected_point = None;
        }
        self.selected_layer = id;
    }

    /// Select a handle of the selected shape
    pub fn select_point(&mut self, index: Option<usize>) {
        self.selected_point = index;
    }

    /// Selected layer id
    pub fn selected_layer_id(&self) -> Option<LayerId> {
        self.selected_layer
    }

    /// Selected layer
    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selected_layer.and_then(|id| self.state().layer(id))
    }

    /// Shape behind the selected layer
    pub fn selected_shape(&self) -> Option<&Shape> {
        self.selected_layer
            .and_then(|id| self.state().shape_for_layer(id))
    }

    /// Selected handle index
    pub fn selected_point(&self) -> Option<usize> {
        self.selected_point
    }

    /// Topmost visible layer whose shape contains `p`
    pub fn layer_at(&self, p: Point) -> Option<LayerId> {
        let state = self.state();
        state
            .layers
            .iter()
            .rev()
            .filter(|l| l.visible)
            .find(|l| state.shape(l.shape_id).is_some_and(|s| s.hit_test(p)))
            .map(|l| l.id)
    }

    /// Handle of the selected shape within `radius` of `p`, nearest first
    pub fn handle_at(&self, p: Point, radius: f32) -> Option<usize> {
        if !self.selected_layer().is_some_and(|l| l.visible) {
            return None;
        }
        let shape = self.selected_shape()?;
        shape
            .world_handles()
            .into_iter()
            .map(|h| (h.index, h.position.distance(p)))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    // --- Scenes ---

    /// Snapshot the project as a new scene
    pub fn save_scene(&mut self) -> SceneId {
        let state = self.history.current().clone();
        self.scenes.save(&state).id()
    }

    /// Replace the project with a saved scene as one committed edit
    pub fn load_scene(&mut self, id: SceneId) -> Result<()> {
        let state = self.scenes.get(id)?.state().clone();
        info!("Loading scene {}", id);
        self.set_state(state, true);
        Ok(())
    }

    // --- Media & devices ---

    /// Register an upload and create a rect showing it. Unsupported files
    /// raise a notice and change nothing.
    pub fn upload_media(
        &mut self,
        name: &str,
        url: &str,
        mime: Option<&str>,
        size: Option<Vec2>,
    ) -> Option<(ShapeId, LayerId)> {
        if self.media.add_item(name, url, mime, size).is_none() {
            self.notify(
                NoticeLevel::Warning,
                format!("'{}' is not an image or video", name),
            );
            return None;
        }
        Some(self.add_layer(
            media_rect(),
            Visual::Media {
                url: url.to_string(),
            },
            name,
        ))
    }

    /// Open a camera and create a rect showing it. On failure a notice is
    /// raised and nothing changes.
    pub fn connect_camera(
        &mut self,
        camera: &mut dyn VideoStreamSource,
    ) -> Option<(ShapeId, LayerId)> {
        let (stream_id, name) = match self.media.acquire_stream(camera) {
            Ok(stream) => (stream.id, stream.name.clone()),
            Err(e) => {
                self.report_device_error("Camera", &e);
                return None;
            }
        };
        Some(self.add_layer(media_rect(), Visual::LiveInput { stream_id }, name))
    }

    /// Switch `feed` to a microphone. On failure a notice is raised and the
    /// feed keeps its current source.
    pub fn connect_microphone(
        &mut self,
        feed: &mut AudioFeed,
        microphone: &mut dyn MicrophoneSource,
        settings: &AudioSettings,
    ) -> bool {
        match feed.connect_microphone(microphone, settings) {
            Ok(()) => true,
            Err(e) => {
                self.report_device_error("Microphone", &e);
                false
            }
        }
    }

    fn report_device_error(&mut self, device: &str, error: &DeviceError) {
        let err = CoreError::from(error.clone());
        warn!("{} acquisition failed: {}", device, err);
        self.notify(NoticeLevel::Error, format!("{} access failed: {}", device, error));
    }

    // --- Suggestions ---

    /// Validate a suggestion response and apply it to `shape_id` as one
    /// committed edit. Failures raise a notice and leave the shape unchanged.
    pub fn apply_suggestion(&mut self, shape_id: ShapeId, response: Result<String>) -> bool {
        let result = response.and_then(|text| parse_suggestion(&text)).and_then(|suggestion| {
            let patch = ShapePatch {
                visual: Some(Visual::generative(suggestion.visual)),
                visual_options: Some(suggestion.visual_options),
                ..Default::default()
            };
            self.update_shape(shape_id, &patch, true)
        });
        match result {
            Ok(changed) => {
                info!("Applied suggestion to shape {}", shape_id);
                changed
            }
            Err(e) => {
                warn!("Suggestion rejected: {}", e);
                self.notify(NoticeLevel::Error, format!("Could not apply suggestion: {}", e));
                false
            }
        }
    }

    // --- Notices ---

    /// Queue a user-visible notice
    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push_back(Notice {
            level,
            message: message.into(),
        });
    }

    /// Pending notices, oldest first
    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    /// Take all pending notices
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    // --- Frame ---

    /// Compose the current project for `time_ms`
    pub fn render(&mut self, time_ms: f64, audio: &AudioFrame) -> RenderFrame {
        let state = self.history.current();
        self.compositor.tick(state, &self.media, time_ms, audio)
    }
}
