//! In-memory repository service.
//!
//! Holds a working tree per branch, records every call in order, and can be
//! armed to fail a specific call. Backs the test suites.

use super::{RemoteRepository, SEARCH_RESULT_LIMIT};
use crate::error::ApiError;
use crate::tree::{path, TreeNode};
use crate::types::{BranchInfo, ContentMatch, RepoStatus, SearchKind, SearchResults};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    GetTree,
    GetFile,
    Write,
    Delete,
    Move,
    MoveFolder,
    Commit,
    Status,
    Branches,
    Search,
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    GetTree { branch: Option<String> },
    GetFile { path: String },
    Write { path: String, content: String },
    Delete { path: String },
    Move { from: String, to: String },
    MoveFolder { from: String, to: String },
    Commit { message: String },
    Status,
    Branches,
    Search { query: String, kind: SearchKind },
}

impl RemoteCall {
    pub fn kind(&self) -> CallKind {
        match self {
            RemoteCall::GetTree { .. } => CallKind::GetTree,
            RemoteCall::GetFile { .. } => CallKind::GetFile,
            RemoteCall::Write { .. } => CallKind::Write,
            RemoteCall::Delete { .. } => CallKind::Delete,
            RemoteCall::Move { .. } => CallKind::Move,
            RemoteCall::MoveFolder { .. } => CallKind::MoveFolder,
            RemoteCall::Commit { .. } => CallKind::Commit,
            RemoteCall::Status => CallKind::Status,
            RemoteCall::Branches => CallKind::Branches,
            RemoteCall::Search { .. } => CallKind::Search,
        }
    }

    /// Path the call operates on, for moves the source.
    fn subject(&self) -> Option<&str> {
        match self {
            RemoteCall::GetFile { path }
            | RemoteCall::Write { path, .. }
            | RemoteCall::Delete { path } => Some(path),
            RemoteCall::Move { from, .. } | RemoteCall::MoveFolder { from, .. } => Some(from),
            RemoteCall::GetTree { .. }
            | RemoteCall::Commit { .. }
            | RemoteCall::Status
            | RemoteCall::Branches
            | RemoteCall::Search { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Failure {
    kind: CallKind,
    path: Option<String>,
    reason: String,
}

#[derive(Debug, Default)]
struct State {
    /// Working tree of the served branch
    files: BTreeMap<String, String>,
    /// Committed snapshots of other branches
    branches: BTreeMap<String, BTreeMap<String, String>>,
    dirty: bool,
    commits: usize,
    calls: Vec<RemoteCall>,
    failures: Vec<Failure>,
}

pub struct MemoryRemote {
    source: String,
    branch: String,
    state: Mutex<State>,
}

impl MemoryRemote {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            source: "memory".to_string(),
            branch: branch.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// Seed the served branch with files.
    pub fn with_files<I, P, C>(self, files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: Into<String>,
    {
        {
            let mut state = self.state.lock();
            for (file, content) in files {
                state.files.insert(path::normalize(file.as_ref()), content.into());
            }
        }
        self
    }

    /// Add another branch with a committed snapshot.
    pub fn with_branch<I, P, C>(self, name: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: Into<String>,
    {
        let snapshot = files
            .into_iter()
            .map(|(p, c)| (path::normalize(p.as_ref()), c.into()))
            .collect();
        self.state.lock().branches.insert(name.into(), snapshot);
        self
    }

    /// Fail every call of `kind`.
    pub fn fail_on(&self, kind: CallKind, reason: impl Into<String>) {
        self.state.lock().failures.push(Failure {
            kind,
            path: None,
            reason: reason.into(),
        });
    }

    /// Fail calls of `kind` whose subject is `target`.
    pub fn fail_on_path(&self, kind: CallKind, target: &str, reason: impl Into<String>) {
        self.state.lock().failures.push(Failure {
            kind,
            path: Some(path::normalize(target)),
            reason: reason.into(),
        });
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state.lock().calls.clone()
    }

    /// Recorded calls that mutate the repository.
    pub fn mutating_calls(&self) -> Vec<RemoteCall> {
        self.calls()
            .into_iter()
            .filter(|c| {
                matches!(
                    c.kind(),
                    CallKind::Write
                        | CallKind::Delete
                        | CallKind::Move
                        | CallKind::MoveFolder
                        | CallKind::Commit
                )
            })
            .collect()
    }

    pub fn file(&self, target: &str) -> Option<String> {
        self.state.lock().files.get(&path::normalize(target)).cloned()
    }

    pub fn file_paths(&self) -> Vec<String> {
        self.state.lock().files.keys().cloned().collect()
    }

    /// Record `call`, then fail it if it was armed to.
    fn record(&self, state: &mut State, call: RemoteCall, action: &str) -> Result<(), ApiError> {
        debug!(?call, "Memory remote call");
        let failure = state
            .failures
            .iter()
            .find(|f| {
                f.kind == call.kind()
                    && f.path
                        .as_deref()
                        .map_or(true, |p| call.subject() == Some(p))
            })
            .cloned();
        state.calls.push(call);
        match failure {
            Some(failure) => Err(ApiError::remote(action, failure.reason)),
            None => Ok(()),
        }
    }

    fn is_served(&self, branch: Option<&str>) -> bool {
        branch.map_or(true, |b| b.is_empty() || b == self.branch)
    }

    fn filename_matches(files: &BTreeMap<String, String>, query: &str) -> Vec<String> {
        if query.is_empty() {
            return Vec::new();
        }
        let query = query.to_lowercase();
        let mut scored: Vec<(usize, &String)> = files
            .keys()
            .filter_map(|p| {
                let score = fuzzy_score(&query, &p.to_lowercase());
                (score > 0).then_some((score, p))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.len().cmp(&b.1.len())));
        scored
            .into_iter()
            .take(SEARCH_RESULT_LIMIT)
            .map(|(_, p)| p.clone())
            .collect()
    }

    fn content_matches(files: &BTreeMap<String, String>, query: &str) -> Vec<ContentMatch> {
        let mut results = Vec::new();
        if query.is_empty() {
            return results;
        }
        let query = query.to_lowercase();
        for (file, content) in files {
            if content.contains('\0') {
                continue;
            }
            let lines: Vec<&str> = content.lines().collect();
            for (idx, line) in lines.iter().enumerate() {
                let lower = line.to_lowercase();
                let Some(start) = lower.find(&query) else {
                    continue;
                };
                let match_text = line
                    .get(start..start + query.len())
                    .unwrap_or(line)
                    .to_string();
                let from = idx.saturating_sub(1);
                let to = (idx + 2).min(lines.len());
                results.push(ContentMatch {
                    path: file.clone(),
                    line_number: idx + 1,
                    context: lines[from..to].iter().map(|l| l.to_string()).collect(),
                    match_text,
                });
                if results.len() >= SEARCH_RESULT_LIMIT {
                    return results;
                }
            }
        }
        results
    }
}

/// 1000 exact, 100 substring, 50 all characters in order, 0 no match.
fn fuzzy_score(query: &str, candidate: &str) -> usize {
    if query == candidate {
        return 1000;
    }
    if candidate.contains(query) {
        return 100;
    }
    let mut wanted = query.chars().peekable();
    for c in candidate.chars() {
        if wanted.peek() == Some(&c) {
            wanted.next();
        }
    }
    if wanted.peek().is_none() {
        50
    } else {
        0
    }
}

#[async_trait]
impl RemoteRepository for MemoryRemote {
    async fn get_tree(&self, branch: Option<&str>) -> Result<TreeNode, ApiError> {
        let mut state = self.state.lock();
        self.record(
            &mut state,
            RemoteCall::GetTree {
                branch: branch.map(str::to_string),
            },
            "fetch tree",
        )?;
        if self.is_served(branch) {
            return Ok(TreeNode::from_file_paths(state.files.keys()));
        }
        let name = branch.unwrap_or_default();
        match state.branches.get(name) {
            Some(files) => Ok(TreeNode::from_file_paths(files.keys())),
            None => Err(ApiError::remote(
                "fetch tree",
                format!("branch '{}' not found", name),
            )),
        }
    }

    async fn get_file(&self, target: &str, branch: Option<&str>) -> Result<String, ApiError> {
        let key = path::normalize(target);
        let mut state = self.state.lock();
        self.record(
            &mut state,
            RemoteCall::GetFile { path: key.clone() },
            &format!("fetch file {}", key),
        )?;
        let files = if self.is_served(branch) {
            Some(&state.files)
        } else {
            state.branches.get(branch.unwrap_or_default())
        };
        files
            .and_then(|files| files.get(&key).cloned())
            .ok_or(ApiError::NotFound(key))
    }

    async fn write_file(&self, target: &str, content: &str) -> Result<(), ApiError> {
        let key = path::normalize(target);
        let action = format!("write {}", key);
        let mut state = self.state.lock();
        self.record(
            &mut state,
            RemoteCall::Write {
                path: key.clone(),
                content: content.to_string(),
            },
            &action,
        )?;
        if key.is_empty() {
            return Err(ApiError::remote(action, "path cannot be empty"));
        }
        state.files.insert(key, content.to_string());
        state.dirty = true;
        Ok(())
    }

    async fn delete_file(&self, target: &str) -> Result<(), ApiError> {
        let key = path::normalize(target);
        let action = format!("delete {}", key);
        let mut state = self.state.lock();
        self.record(&mut state, RemoteCall::Delete { path: key.clone() }, &action)?;
        if state.files.remove(&key).is_none() {
            return Err(ApiError::remote(action, "file not found"));
        }
        state.dirty = true;
        Ok(())
    }

    async fn move_file(&self, old_path: &str, new_path: &str) -> Result<(), ApiError> {
        let from = path::normalize(old_path);
        let to = path::normalize(new_path);
        let action = format!("move {} to {}", from, to);
        let mut state = self.state.lock();
        self.record(
            &mut state,
            RemoteCall::Move {
                from: from.clone(),
                to: to.clone(),
            },
            &action,
        )?;
        if state.files.contains_key(&to) {
            return Err(ApiError::remote(action, "destination file already exists"));
        }
        let content = state
            .files
            .remove(&from)
            .ok_or_else(|| ApiError::remote(action.as_str(), "source file not found"))?;
        state.files.insert(to, content);
        state.dirty = true;
        Ok(())
    }

    async fn move_folder(&self, old_path: &str, new_path: &str) -> Result<(), ApiError> {
        let from = path::normalize(old_path);
        let to = path::normalize(new_path);
        let action = format!("move folder {} to {}", from, to);
        let mut state = self.state.lock();
        self.record(
            &mut state,
            RemoteCall::MoveFolder {
                from: from.clone(),
                to: to.clone(),
            },
            &action,
        )?;
        if path::is_within(&to, &from) {
            return Err(ApiError::remote(action, "cannot move folder into itself"));
        }
        if state
            .files
            .keys()
            .any(|p| *p == to || path::is_within(p, &to))
        {
            return Err(ApiError::remote(action, "destination folder already exists"));
        }
        let moving: Vec<String> = state
            .files
            .keys()
            .filter(|p| path::is_within(p, &from))
            .cloned()
            .collect();
        if moving.is_empty() {
            return Err(ApiError::remote(action, "source folder not found"));
        }
        for old in moving {
            if let Some(content) = state.files.remove(&old) {
                state.files.insert(path::rebase(&old, &from, &to), content);
            }
        }
        state.dirty = true;
        Ok(())
    }

    async fn commit(&self, message: &str) -> Result<String, ApiError> {
        let mut state = self.state.lock();
        self.record(
            &mut state,
            RemoteCall::Commit {
                message: message.to_string(),
            },
            "commit",
        )?;
        if message.trim().is_empty() {
            return Err(ApiError::remote("commit", "commit message cannot be empty"));
        }
        state.commits += 1;
        state.dirty = false;
        let snapshot = state.files.clone();
        state.branches.insert(self.branch.clone(), snapshot);
        Ok(format!("{:040x}", state.commits))
    }

    async fn get_status(&self) -> Result<RepoStatus, ApiError> {
        let mut state = self.state.lock();
        self.record(&mut state, RemoteCall::Status, "fetch status")?;
        Ok(RepoStatus {
            source: self.source.clone(),
            branch: self.branch.clone(),
            is_dirty: state.dirty,
        })
    }

    async fn list_branches(&self) -> Result<Vec<BranchInfo>, ApiError> {
        let mut state = self.state.lock();
        self.record(&mut state, RemoteCall::Branches, "fetch branches")?;
        let mut names: Vec<String> = state.branches.keys().cloned().collect();
        if !names.contains(&self.branch) {
            names.push(self.branch.clone());
            names.sort();
        }
        Ok(names
            .into_iter()
            .map(|name| BranchInfo {
                is_default: name == self.branch,
                name,
            })
            .collect())
    }

    async fn search(&self, query: &str, kind: SearchKind) -> Result<SearchResults, ApiError> {
        let mut state = self.state.lock();
        self.record(
            &mut state,
            RemoteCall::Search {
                query: query.to_string(),
                kind,
            },
            "search",
        )?;
        Ok(match kind {
            SearchKind::Filename => {
                SearchResults::Filenames(Self::filename_matches(&state.files, query))
            }
            SearchKind::Content => {
                SearchResults::Content(Self::content_matches(&state.files, query))
            }
        })
    }
}
