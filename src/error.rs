//! Error types
//!
//! `ValidationError` covers everything rejected before a remote call is made.
//! `ApiError` is the crate-wide error returned by fallible operations.

use thiserror::Error;

/// Rejections raised before any remote call. Surfaced inline, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Commit message cannot be empty")]
    EmptyMessage,

    #[error("No changes to commit")]
    NoChanges,

    #[error("Path is required")]
    EmptyPath,

    #[error("Path '{path}' contains reserved character {character:?}")]
    ReservedCharacter { path: String, character: char },

    #[error("Path '{0}' cannot contain \"..\"")]
    PathTraversal(String),

    #[error("New path is the same as current path")]
    SamePath,

    #[error("A file already exists at '{0}'")]
    TargetExists(String),

    #[error("Cannot move folder '{from}' into itself ('{to}')")]
    FolderIntoItself { from: String, to: String },

    #[error("A folder already exists at '{0}'")]
    FolderExists(String),
}

/// Crate-wide error.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Any remote call failing; `action` reads like "write docs/a.md".
    #[error("failed to {action}: {reason}")]
    Remote { action: String, reason: String },

    /// File fetch for a path the remote does not have.
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Switching to branch '{branch}' would orphan {pending} pending change(s)")]
    BranchSwitch { branch: String, pending: usize },

    #[error("Invalid change plan: {0}")]
    Plan(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn remote(action: impl Into<String>, reason: impl ToString) -> Self {
        ApiError::Remote {
            action: action.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
