//! Commit pipeline
//!
//! Flushes the pending log to the remote as one ordered sequence: deletes,
//! then moves, then writes, then a single commit. Calls run strictly one after
//! another; the first failure aborts the run and leaves the store untouched.
//! Nothing already applied on the remote is rolled back.

use crate::error::{ApiError, ValidationError};
use crate::remote::RemoteRepository;
use crate::staging::PendingChangeStore;
use crate::types::{CommitResult, PendingChange};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One remote call in a planned commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum RemoteOp {
    Delete { path: String },
    Move { from: String, to: String },
    MoveFolder { from: String, to: String },
    Write { path: String, content: String },
    Commit { message: String },
}

impl fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteOp::Delete { path } => write!(f, "delete {}", path),
            RemoteOp::Move { from, to } => write!(f, "move {} -> {}", from, to),
            RemoteOp::MoveFolder { from, to } => write!(f, "move folder {} -> {}", from, to),
            RemoteOp::Write { path, content } => {
                write!(f, "write {} ({} bytes)", path, content.len())
            }
            RemoteOp::Commit { message } => write!(f, "commit \"{}\"", message),
        }
    }
}

pub struct CommitPipeline {
    store: PendingChangeStore,
    remote: Arc<dyn RemoteRepository>,
}

impl CommitPipeline {
    pub fn new(store: PendingChangeStore, remote: Arc<dyn RemoteRepository>) -> Self {
        Self { store, remote }
    }

    /// Ordered remote calls for `changes`, excluding the final commit.
    ///
    /// Within each phase changes keep their pending-log order.
    pub fn plan(changes: &[PendingChange]) -> Vec<RemoteOp> {
        let deletes = changes.iter().filter_map(|c| match c {
            PendingChange::Delete { path } => Some(RemoteOp::Delete { path: path.clone() }),
            _ => None,
        });
        let moves = changes.iter().filter_map(|c| match c {
            PendingChange::Move { path, old_path } => Some(RemoteOp::Move {
                from: old_path.clone(),
                to: path.clone(),
            }),
            PendingChange::MoveFolder { path, old_path } => Some(RemoteOp::MoveFolder {
                from: old_path.clone(),
                to: path.clone(),
            }),
            _ => None,
        });
        let writes = changes.iter().filter_map(|c| match c {
            PendingChange::Create { path, content } | PendingChange::Modify { path, content } => {
                Some(RemoteOp::Write {
                    path: path.clone(),
                    content: content.clone(),
                })
            }
            _ => None,
        });
        deletes.chain(moves).chain(writes).collect()
    }

    /// Apply `changes` to the remote and commit them with `message`.
    ///
    /// Clears the store only after the remote commit succeeds.
    pub async fn commit(
        &self,
        changes: &[PendingChange],
        message: &str,
    ) -> Result<CommitResult, ApiError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }
        if changes.is_empty() {
            return Err(ValidationError::NoChanges.into());
        }

        let ops = Self::plan(changes);
        info!(changes = changes.len(), calls = ops.len() + 1, "Committing pending changes");

        let mut result = CommitResult {
            commit_id: String::new(),
            deleted: 0,
            moved: 0,
            written: 0,
        };
        for op in &ops {
            debug!(%op, "Applying");
            if let Err(err) = self.apply(op).await {
                warn!(%op, error = %err, "Commit aborted; pending changes kept");
                return Err(err);
            }
            match op {
                RemoteOp::Delete { .. } => result.deleted += 1,
                RemoteOp::Move { .. } | RemoteOp::MoveFolder { .. } => result.moved += 1,
                RemoteOp::Write { .. } => result.written += 1,
                RemoteOp::Commit { .. } => {}
            }
        }

        result.commit_id = self.remote.commit(message).await.map_err(|err| {
            warn!(error = %err, "Remote commit failed; pending changes kept");
            err
        })?;
        self.store.clear_changes();
        info!(commit = %result.commit_id, "Commit complete");
        Ok(result)
    }

    async fn apply(&self, op: &RemoteOp) -> Result<(), ApiError> {
        match op {
            RemoteOp::Delete { path } => self.remote.delete_file(path).await,
            RemoteOp::Move { from, to } => self.remote.move_file(from, to).await,
            RemoteOp::MoveFolder { from, to } => self.remote.move_folder(from, to).await,
            RemoteOp::Write { path, content } => self.remote.write_file(path, content).await,
            RemoteOp::Commit { message } => self.remote.commit(message).await.map(|_| ()),
        }
    }
}
