//! Pending-change store
//!
//! The staging log for one editing session: at most one change per canonical
//! target path, last write wins. Clones share the same log, so every consumer
//! (tree view, viewer, commit flow) observes the latest writes.

use crate::tree::path;
use crate::types::{ChangeSummary, PendingChange};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Shared handle to the staging log.
#[derive(Debug, Clone, Default)]
pub struct PendingChangeStore {
    /// Surviving entries in insertion order
    changes: Arc<RwLock<Vec<PendingChange>>>,
}

impl PendingChangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a change keyed by its normalized target path.
    ///
    /// A `Create` staged over a pending `Delete` of the same path is stored as
    /// a `Modify`: the file still exists remotely and will be overwritten.
    pub fn add_change(&self, change: PendingChange) {
        let change = change.map_paths(path::normalize);
        let mut changes = self.changes.write();
        let previous = changes
            .iter()
            .position(|c| c.path() == change.path())
            .map(|idx| changes.remove(idx));

        let change = match (previous, change) {
            (Some(PendingChange::Delete { .. }), PendingChange::Create { path, content }) => {
                PendingChange::Modify { path, content }
            }
            (_, change) => change,
        };

        debug!(path = %change.path(), kind = %change.kind(), "Staged change");
        changes.push(change);
    }

    /// Drop the entry keyed by `path`; unknown paths are ignored.
    pub fn remove_change(&self, path: &str) {
        let key = path::normalize(path);
        self.changes.write().retain(|c| c.path() != key);
    }

    pub fn get_changes(&self) -> Vec<PendingChange> {
        self.changes.read().clone()
    }

    pub fn get_change(&self, path: &str) -> Option<PendingChange> {
        let key = path::normalize(path);
        self.changes.read().iter().find(|c| c.path() == key).cloned()
    }

    pub fn clear_changes(&self) {
        self.changes.write().clear();
    }

    /// Staged content for a `Modify` at exactly `path`.
    ///
    /// Creates are not overrides of a remote file and only show up through
    /// the tree overlay.
    pub fn get_modified_content(&self, path: &str) -> Option<String> {
        let key = path::normalize(path);
        self.changes.read().iter().find_map(|c| match c {
            PendingChange::Modify { path, content } if *path == key => Some(content.clone()),
            _ => None,
        })
    }

    pub fn summary(&self) -> ChangeSummary {
        ChangeSummary::from_changes(&self.changes.read())
    }

    pub fn len(&self) -> usize {
        self.changes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.read().is_empty()
    }
}
