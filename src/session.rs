//! Editing session
//!
//! Ties one pending-change store to a remote and a branch. Every view the
//! session hands out (tree, document content) reflects staged edits; commit
//! flushes them through the commit pipeline.

use crate::commit::CommitPipeline;
use crate::config::RemoteConfig;
use crate::error::{ApiError, ValidationError};
use crate::remote::{HttpRemote, RemoteRepository};
use crate::resolve;
use crate::staging::{validation, PendingChangeStore};
use crate::tree::{self, path, TreeNode};
use crate::types::{BranchInfo, CommitResult, PendingChange, RepoStatus, SearchKind, SearchResults};
use std::sync::Arc;
use tracing::{info, warn};

/// What to do with pending changes when switching branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchSwitchPolicy {
    /// Fail with `ApiError::BranchSwitch` if anything is staged
    #[default]
    Refuse,
    /// Drop staged changes and switch
    Discard,
}

pub struct EditSession {
    store: PendingChangeStore,
    remote: Arc<dyn RemoteRepository>,
    branch: Option<String>,
    asset_prefix: String,
}

impl EditSession {
    pub fn new(remote: Arc<dyn RemoteRepository>, branch: Option<String>) -> Self {
        Self {
            store: PendingChangeStore::new(),
            remote,
            branch,
            asset_prefix: resolve::DEFAULT_ASSET_PREFIX.to_string(),
        }
    }

    /// Session against the HTTP service described by `config`.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, ApiError> {
        let remote = HttpRemote::new(config)?;
        Ok(Self::new(Arc::new(remote), config.branch.clone())
            .with_asset_prefix(&config.asset_prefix))
    }

    pub fn with_asset_prefix(mut self, prefix: &str) -> Self {
        self.asset_prefix = prefix.to_string();
        self
    }

    pub fn store(&self) -> &PendingChangeStore {
        &self.store
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// Remote tree with staged changes applied.
    pub async fn tree(&self) -> Result<TreeNode, ApiError> {
        let remote_tree = self.remote.get_tree(self.branch()).await?;
        Ok(tree::merge_tree(&remote_tree, &self.store.get_changes()))
    }

    /// Content to show for `target`.
    ///
    /// Staged creates and modifies are served from the store; a staged move
    /// is read from its old location; a staged delete is `NotFound`. Files
    /// inside a staged folder move are read from the folder's old location.
    pub async fn open_document(&self, target: &str) -> Result<String, ApiError> {
        let key = path::normalize(target);
        match self.store.get_change(&key) {
            Some(PendingChange::Create { content, .. })
            | Some(PendingChange::Modify { content, .. }) => Ok(content),
            Some(PendingChange::Delete { .. }) => Err(ApiError::NotFound(key)),
            Some(PendingChange::Move { old_path, .. }) => self.read_remote(&old_path).await,
            Some(PendingChange::MoveFolder { .. }) | None => self.read_remote(&key).await,
        }
    }

    async fn read_remote(&self, key: &str) -> Result<String, ApiError> {
        let source = self.remote_source(key);
        if source != key {
            if let Some(PendingChange::Delete { .. }) = self.store.get_change(&source) {
                return Err(ApiError::NotFound(key.to_string()));
            }
        }
        self.remote.get_file(&source, self.branch()).await
    }

    /// Path that `key` has on the remote today, undoing staged folder moves.
    fn remote_source(&self, key: &str) -> String {
        let mut source = key.to_string();
        for change in self.store.get_changes().iter().rev() {
            if let PendingChange::MoveFolder { path, old_path } = change {
                source = path::rebase(&source, path, old_path);
            }
        }
        source
    }

    async fn visible_paths(&self) -> Result<Vec<String>, ApiError> {
        Ok(tree::extract_all_paths(&self.tree().await?))
    }

    pub async fn stage_create_file(&self, raw: &str) -> Result<String, ApiError> {
        let change = validation::create_file(raw, &self.visible_paths().await?)?;
        let staged = change.path().to_string();
        self.store.add_change(change);
        Ok(staged)
    }

    pub async fn stage_create_folder(&self, raw: &str) -> Result<String, ApiError> {
        let change = validation::create_folder(raw, &self.visible_paths().await?)?;
        let staged = change.path().to_string();
        self.store.add_change(change);
        Ok(staged)
    }

    /// Stage a rename of the file or folder at `current`.
    ///
    /// Changes already staged at `current` (or inside it, for a folder) are
    /// carried over to the new location.
    pub async fn stage_rename(&self, current: &str, raw_target: &str) -> Result<String, ApiError> {
        let current = path::normalize(current);
        if current.is_empty() {
            return Err(ValidationError::EmptyPath.into());
        }
        let overlay = self.tree().await?;
        let is_folder = tree::find_node_by_path(&overlay, &current)
            .map(|n| n.is_dir)
            .ok_or_else(|| ApiError::NotFound(current.clone()))?;
        let existing = tree::extract_all_paths(&overlay);
        let change = validation::rename(&current, raw_target, &existing, is_folder)?;
        let target = change.path().to_string();
        if is_folder {
            self.rename_folder(&current, &target);
        } else {
            self.rename_file(&current, &target);
        }
        Ok(target)
    }

    fn rename_file(&self, current: &str, target: &str) {
        match self.store.get_change(current) {
            Some(PendingChange::Create { content, .. }) => {
                self.store.remove_change(current);
                self.store.add_change(PendingChange::create(target, content));
            }
            // An edited file is renamed as delete plus create, so the edit
            // lands at the new path in the same commit.
            Some(PendingChange::Modify { content, .. }) => {
                self.store.remove_change(current);
                self.store.add_change(PendingChange::delete(self.remote_source(current)));
                self.store.add_change(PendingChange::create(target, content));
            }
            Some(PendingChange::Move { old_path, .. }) => {
                self.store.remove_change(current);
                if old_path != target {
                    self.store.add_change(PendingChange::move_file(target, old_path));
                }
            }
            _ => self.store.add_change(PendingChange::move_file(target, current)),
        }
    }

    fn rename_folder(&self, current: &str, target: &str) {
        let staged = self.store.get_changes();
        match self.store.get_change(current) {
            Some(PendingChange::MoveFolder { old_path, .. }) => {
                self.store.remove_change(current);
                if old_path != target {
                    self.store.add_change(PendingChange::move_folder(target, old_path));
                }
            }
            _ => self.store.add_change(PendingChange::move_folder(target, current)),
        }

        // Deletes run before any move, so they keep their remote paths. Every
        // other change inside the folder follows it and is re-queued after
        // the folder move.
        for change in staged {
            if matches!(change, PendingChange::Delete { .. }) || change.path() == current {
                continue;
            }
            let inside = path::is_within(change.path(), current)
                || change.old_path().is_some_and(|p| path::is_within(p, current));
            if inside {
                self.store.remove_change(change.path());
                self.store
                    .add_change(change.map_paths(|p| path::rebase(p, current, target)));
            }
        }
    }

    /// Stage new content for a file; a pending create keeps its kind.
    ///
    /// Editing a staged move target turns the move into delete plus create.
    pub fn stage_edit(&self, target: &str, content: &str) {
        let key = path::normalize(target);
        let change = match self.store.get_change(&key) {
            Some(PendingChange::Create { path, .. }) => PendingChange::create(path, content),
            Some(PendingChange::Move { path, old_path }) => {
                self.store.remove_change(&path);
                self.store.add_change(PendingChange::delete(self.remote_source(&old_path)));
                PendingChange::create(path, content)
            }
            _ => PendingChange::modify(key, content),
        };
        self.store.add_change(change);
    }

    /// Stage deletion of a file.
    ///
    /// Deleting a staged create just unstages it; deleting a staged move
    /// target deletes the move's source instead. Files inside a staged folder
    /// move are deleted at their remote location.
    pub fn stage_delete(&self, target: &str) {
        let key = path::normalize(target);
        match self.store.get_change(&key) {
            Some(PendingChange::Create { path, .. }) => self.store.remove_change(&path),
            Some(PendingChange::Move { path, old_path }) => {
                self.store.remove_change(&path);
                self.store.add_change(PendingChange::delete(self.remote_source(&old_path)));
            }
            _ => {
                self.store.remove_change(&key);
                self.store.add_change(PendingChange::delete(self.remote_source(&key)));
            }
        }
    }

    pub fn unstage(&self, target: &str) {
        self.store.remove_change(target);
    }

    pub async fn commit(&self, message: &str) -> Result<CommitResult, ApiError> {
        let pipeline = CommitPipeline::new(self.store.clone(), self.remote.clone());
        pipeline.commit(&self.store.get_changes(), message).await
    }

    pub fn switch_branch(
        &mut self,
        branch: &str,
        policy: BranchSwitchPolicy,
    ) -> Result<(), ApiError> {
        let pending = self.store.len();
        if pending > 0 {
            match policy {
                BranchSwitchPolicy::Refuse => {
                    return Err(ApiError::BranchSwitch {
                        branch: branch.to_string(),
                        pending,
                    })
                }
                BranchSwitchPolicy::Discard => {
                    warn!(branch, pending, "Discarding pending changes on branch switch");
                    self.store.clear_changes();
                }
            }
        }
        info!(branch, "Switched branch");
        self.branch = Some(branch.to_string());
        Ok(())
    }

    pub async fn status(&self) -> Result<RepoStatus, ApiError> {
        self.remote.get_status().await
    }

    pub async fn branches(&self) -> Result<Vec<BranchInfo>, ApiError> {
        self.remote.list_branches().await
    }

    pub async fn search(&self, query: &str, kind: SearchKind) -> Result<SearchResults, ApiError> {
        self.remote.search(query, kind).await
    }

    /// In-app route for a link found in `document`; `None` resolves from the root.
    pub fn resolve_link(&self, reference: &str, document: Option<&str>) -> String {
        let base = document.map(resolve::document_base);
        resolve::resolve_link(reference, base.as_deref())
    }

    /// Fetchable URL for an asset referenced from `document`.
    pub fn resolve_asset(&self, reference: &str, document: Option<&str>) -> String {
        let base = document.map(resolve::document_base);
        resolve::resolve_asset(reference, base.as_deref(), &self.asset_prefix)
    }
}
