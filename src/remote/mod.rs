//! Remote repository service
//!
//! The editing core talks to the repository only through `RemoteRepository`.
//! Each call is assumed atomic on its own; ordering across calls is the
//! commit pipeline's job.

mod http;
mod memory;

pub use http::HttpRemote;
pub use memory::{CallKind, MemoryRemote, RemoteCall};

use crate::error::ApiError;
use crate::tree::TreeNode;
use crate::types::{BranchInfo, RepoStatus, SearchKind, SearchResults};
use async_trait::async_trait;

/// Maximum number of search results a remote returns.
pub const SEARCH_RESULT_LIMIT: usize = 50;

#[async_trait]
pub trait RemoteRepository: Send + Sync {
    /// Full tree snapshot; `None` means the branch the service is serving.
    async fn get_tree(&self, branch: Option<&str>) -> Result<TreeNode, ApiError>;

    /// File content; `ApiError::NotFound` when the path is absent or a directory.
    async fn get_file(&self, path: &str, branch: Option<&str>) -> Result<String, ApiError>;

    async fn write_file(&self, path: &str, content: &str) -> Result<(), ApiError>;

    async fn delete_file(&self, path: &str) -> Result<(), ApiError>;

    async fn move_file(&self, old_path: &str, new_path: &str) -> Result<(), ApiError>;

    async fn move_folder(&self, old_path: &str, new_path: &str) -> Result<(), ApiError>;

    /// Commit the service's working tree; returns the commit identifier.
    async fn commit(&self, message: &str) -> Result<String, ApiError>;

    async fn get_status(&self) -> Result<RepoStatus, ApiError>;

    async fn list_branches(&self) -> Result<Vec<BranchInfo>, ApiError>;

    async fn search(&self, query: &str, kind: SearchKind) -> Result<SearchResults, ApiError>;
}
