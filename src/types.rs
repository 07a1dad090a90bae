//! Core types shared by the staging log, overlay, commit pipeline and remote.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An uncommitted file-level mutation.
///
/// `path` is always the target location and the identity key in the staging
/// log; `old_path` is only carried by the move variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PendingChange {
    Create {
        path: String,
        #[serde(default)]
        content: String,
    },
    Modify {
        path: String,
        content: String,
    },
    Delete {
        path: String,
    },
    Move {
        path: String,
        #[serde(rename = "oldPath", alias = "old_path")]
        old_path: String,
    },
    MoveFolder {
        path: String,
        #[serde(rename = "oldPath", alias = "old_path")]
        old_path: String,
    },
}

/// Discriminant of a `PendingChange`, used for summaries and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeKind {
    Create,
    Modify,
    Delete,
    Move,
    MoveFolder,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Create => "create",
            ChangeKind::Modify => "modify",
            ChangeKind::Delete => "delete",
            ChangeKind::Move => "move",
            ChangeKind::MoveFolder => "move-folder",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PendingChange {
    pub fn create(path: impl Into<String>, content: impl Into<String>) -> Self {
        PendingChange::Create {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn modify(path: impl Into<String>, content: impl Into<String>) -> Self {
        PendingChange::Modify {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        PendingChange::Delete { path: path.into() }
    }

    /// File move from `old_path` to `path`.
    pub fn move_file(path: impl Into<String>, old_path: impl Into<String>) -> Self {
        PendingChange::Move {
            path: path.into(),
            old_path: old_path.into(),
        }
    }

    /// Folder move from `old_path` to `path`.
    pub fn move_folder(path: impl Into<String>, old_path: impl Into<String>) -> Self {
        PendingChange::MoveFolder {
            path: path.into(),
            old_path: old_path.into(),
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            PendingChange::Create { .. } => ChangeKind::Create,
            PendingChange::Modify { .. } => ChangeKind::Modify,
            PendingChange::Delete { .. } => ChangeKind::Delete,
            PendingChange::Move { .. } => ChangeKind::Move,
            PendingChange::MoveFolder { .. } => ChangeKind::MoveFolder,
        }
    }

    /// Target path; the key in the staging log.
    pub fn path(&self) -> &str {
        match self {
            PendingChange::Create { path, .. }
            | PendingChange::Modify { path, .. }
            | PendingChange::Delete { path }
            | PendingChange::Move { path, .. }
            | PendingChange::MoveFolder { path, .. } => path,
        }
    }

    pub fn old_path(&self) -> Option<&str> {
        match self {
            PendingChange::Move { old_path, .. } | PendingChange::MoveFolder { old_path, .. } => {
                Some(old_path)
            }
            PendingChange::Create { .. }
            | PendingChange::Modify { .. }
            | PendingChange::Delete { .. } => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            PendingChange::Create { content, .. } | PendingChange::Modify { content, .. } => {
                Some(content)
            }
            PendingChange::Delete { .. }
            | PendingChange::Move { .. }
            | PendingChange::MoveFolder { .. } => None,
        }
    }

    /// Rewrite every path carried by the change through `f`.
    pub fn map_paths(self, f: impl Fn(&str) -> String) -> Self {
        match self {
            PendingChange::Create { path, content } => PendingChange::Create {
                path: f(&path),
                content,
            },
            PendingChange::Modify { path, content } => PendingChange::Modify {
                path: f(&path),
                content,
            },
            PendingChange::Delete { path } => PendingChange::Delete { path: f(&path) },
            PendingChange::Move { path, old_path } => PendingChange::Move {
                path: f(&path),
                old_path: f(&old_path),
            },
            PendingChange::MoveFolder { path, old_path } => PendingChange::MoveFolder {
                path: f(&path),
                old_path: f(&old_path),
            },
        }
    }
}

/// Per-kind counts shown before committing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub created: usize,
    pub modified: usize,
    pub deleted: usize,
    pub moved: usize,
}

impl ChangeSummary {
    pub fn from_changes(changes: &[PendingChange]) -> Self {
        let mut summary = ChangeSummary::default();
        for change in changes {
            match change.kind() {
                ChangeKind::Create => summary.created += 1,
                ChangeKind::Modify => summary.modified += 1,
                ChangeKind::Delete => summary.deleted += 1,
                ChangeKind::Move | ChangeKind::MoveFolder => summary.moved += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.created + self.modified + self.deleted + self.moved
    }
}

/// Branch listing entry; `is_default` marks the branch the service is serving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchInfo {
    pub name: String,
    pub is_default: bool,
}

/// Repository status reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoStatus {
    pub source: String,
    pub branch: String,
    pub is_dirty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Filename,
    Content,
}

impl SearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Filename => "filename",
            SearchKind::Content => "content",
        }
    }
}

/// One full-text match with surrounding lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMatch {
    pub path: String,
    pub line_number: usize,
    pub context: Vec<String>,
    pub match_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SearchResults {
    Filenames(Vec<String>),
    Content(Vec<ContentMatch>),
}

impl SearchResults {
    pub fn len(&self) -> usize {
        match self {
            SearchResults::Filenames(paths) => paths.len(),
            SearchResults::Content(matches) => matches.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of a successful commit pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitResult {
    pub commit_id: String,
    pub deleted: usize,
    pub moved: usize,
    pub written: usize,
}
