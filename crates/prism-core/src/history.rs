//! History management for Undo/Redo
//!
//! A linear list of full project snapshots with a cursor. Committed edits
//! discard the redo tail and append; draft edits overwrite the snapshot
//! under the cursor so continuous gestures stay out of the list.

use crate::state::ProjectState;
use tracing::{debug, trace};

/// Manages the history of project states
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<ProjectState>,
    index: usize,
    max_history: Option<usize>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(ProjectState::default())
    }
}

impl History {
    /// Create a history whose only entry is `initial`
    pub fn new(initial: ProjectState) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            max_history: None,
        }
    }

    /// Cap the number of stored entries; the oldest are dropped first
    pub fn with_limit(mut self, max_history: usize) -> Self {
        self.max_history = Some(max_history.max(1));
        self
    }

    /// Snapshot under the cursor
    pub fn current(&self) -> &ProjectState {
        &self.entries[self.index]
    }

    /// Replace or append `next`.
    ///
    /// No-op when `next` equals the current snapshot. Returns whether
    /// anything changed.
    pub fn set_state(&mut self, next: ProjectState, commit: bool) -> bool {
        if next == *self.current() {
            return false;
        }
        if commit {
            self.entries.truncate(self.index + 1);
            self.entries.push(next);
            self.index += 1;
            if let Some(max) = self.max_history {
                if self.entries.len() > max {
                    let excess = self.entries.len() - max;
                    self.entries.drain(..excess);
                    self.index -= excess;
                }
            }
            debug!("History commit: {} entries, index {}", self.entries.len(), self.index);
        } else {
            self.entries[self.index] = next;
            trace!("History draft at index {}", self.index);
        }
        true
    }

    /// Step back. Returns false at the oldest entry.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.index -= 1;
        debug!("Undo -> index {}", self.index);
        true
    }

    /// Step forward. Returns false at the newest entry.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.index += 1;
        debug!("Redo -> index {}", self.index);
        true
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Number of stored snapshots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; history holds at least the initial state
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position
    pub fn index(&self) -> usize {
        self.index
    }

    /// Drop everything except the current snapshot
    pub fn clear(&mut self) {
        let current = self.entries.swap_remove(self.index);
        self.entries = vec![current];
        self.index = 0;
    }
}
