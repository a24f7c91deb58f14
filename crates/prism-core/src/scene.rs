//! In-memory scene snapshots

use crate::state::ProjectState;
use crate::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Unique identifier for a Scene
pub type SceneId = u64;

/// A named, immutable project snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    id: SceneId,
    name: String,
    saved_at: DateTime<Utc>,
    state: ProjectState,
}

impl Scene {
    /// Unique identifier
    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// When the snapshot was taken
    pub fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }

    /// The captured project
    pub fn state(&self) -> &ProjectState {
        &self.state
    }
}

/// Saved scenes in save order
#[derive(Debug, Clone, Default)]
pub struct SceneLibrary {
    scenes: Vec<Scene>,
    next_id: SceneId,
}

impl SceneLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot `state` as "Scene N"
    pub fn save(&mut self, state: &ProjectState) -> &Scene {
        self.next_id += 1;
        let scene = Scene {
            id: self.next_id,
            name: format!("Scene {}", self.scenes.len() + 1),
            saved_at: Utc::now(),
            state: state.clone(),
        };
        info!("Saved '{}' (id={})", scene.name, scene.id);
        self.scenes.push(scene);
        &self.scenes[self.scenes.len() - 1]
    }

    /// Look up a scene
    pub fn get(&self, id: SceneId) -> Result<&Scene> {
        self.scenes
            .iter()
            .find(|s| s.id == id)
            .ok_or(CoreError::SceneNotFound(id))
    }

    /// All scenes
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Number of scenes
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// True when nothing has been saved
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}
