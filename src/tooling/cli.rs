//! CLI Tooling
//!
//! Command-line interface for browsing and editing a remote repository. Each
//! invocation runs one editing session: staged edits come from a change-plan
//! file and live only for the duration of the command.

use crate::commit::{CommitPipeline, RemoteOp};
use crate::config::{ConfigLoader, FolioConfig};
use crate::error::{ApiError, ValidationError};
use crate::session::EditSession;
use crate::tooling::format;
use crate::tree::path;
use crate::types::{PendingChange, SearchKind};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// Folio CLI - browse and edit a git-backed document repository
#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Stage edits against a git-backed document repository and commit them in one go")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Repository service base URL (overrides remote.base_url)
    #[arg(long)]
    pub remote: Option<String>,

    /// Branch to browse (overrides remote.branch)
    #[arg(long)]
    pub branch: Option<String>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the repository tree with staged changes applied
    Tree {
        /// Change-plan file (TOML or JSON) to stage before rendering
        #[arg(long)]
        changes: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print a document, preferring staged content
    Cat {
        /// Repository path of the document
        path: String,
        /// Change-plan file (TOML or JSON) to stage first
        #[arg(long)]
        changes: Option<PathBuf>,
    },
    /// Show the repository service status
    Status,
    /// List branches
    Branches,
    /// Search file names, or file contents with --content
    Search {
        query: String,
        /// Search file contents instead of names
        #[arg(long)]
        content: bool,
    },
    /// Resolve a link or asset reference found in a document
    Resolve {
        reference: String,
        /// Path of the document containing the reference
        #[arg(long)]
        document: Option<String>,
        /// Resolve as an asset served by the file endpoint
        #[arg(long)]
        asset: bool,
    },
    /// Apply a change plan and commit it
    Commit {
        /// Change-plan file (TOML or JSON)
        #[arg(long)]
        changes: PathBuf,
        /// Commit message
        #[arg(short, long)]
        message: String,
        /// Print the remote calls without making them
        #[arg(long)]
        dry_run: bool,
    },
}

impl Cli {
    /// Load configuration and apply command-line overrides.
    pub fn load_config(&self) -> Result<FolioConfig, ApiError> {
        let mut config = match &self.config {
            Some(path) => ConfigLoader::load_with_file(path)?,
            None => ConfigLoader::load()?,
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut FolioConfig) {
        if let Some(remote) = &self.remote {
            config.remote.base_url = remote.clone();
        }
        if let Some(branch) = &self.branch {
            config.remote.branch = Some(branch.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
    }
}

/// On-disk change plan: `[[changes]]` tables in TOML, or a JSON list.
#[derive(Debug, Deserialize)]
struct ChangePlan {
    changes: Vec<PendingChange>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonChangePlan {
    List(Vec<PendingChange>),
    Wrapped(ChangePlan),
}

/// Read and validate a change-plan file. The format follows the extension;
/// anything other than `.json` is parsed as TOML.
pub fn load_change_plan(file: &Path) -> Result<Vec<PendingChange>, ApiError> {
    let text = std::fs::read_to_string(file)?;
    let is_json = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let changes = if is_json {
        match serde_json::from_str::<JsonChangePlan>(&text)
            .map_err(|e| ApiError::Plan(format!("{}: {}", file.display(), e)))?
        {
            JsonChangePlan::List(changes) => changes,
            JsonChangePlan::Wrapped(plan) => plan.changes,
        }
    } else {
        toml::from_str::<ChangePlan>(&text)
            .map_err(|e| ApiError::Plan(format!("{}: {}", file.display(), e)))?
            .changes
    };

    changes.into_iter().map(validate_planned).collect()
}

fn validate_planned(change: PendingChange) -> Result<PendingChange, ApiError> {
    path::validate(change.path())?;
    if let Some(old) = change.old_path() {
        path::validate(old)?;
    }
    Ok(change.map_paths(|p| path::normalize(p.trim())))
}

/// CLI context for command execution
pub struct CliContext {
    session: EditSession,
    runtime: Runtime,
}

impl CliContext {
    /// Create a new CLI context talking to the configured remote
    pub fn new(config: &FolioConfig) -> Result<Self, ApiError> {
        Self::with_session(EditSession::from_config(&config.remote)?)
    }

    /// Create a context around an existing session
    pub fn with_session(session: EditSession) -> Result<Self, ApiError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        Ok(Self { session, runtime })
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Tree { changes, format } => {
                let staged = self.stage_plan(changes.as_deref())?;
                let tree = self.runtime.block_on(self.session.tree())?;
                if format == "json" {
                    serde_json::to_string_pretty(&tree)
                        .map_err(|e| ApiError::Serialization(e.to_string()))
                } else {
                    Ok(format::format_tree_text(&tree, &staged))
                }
            }
            Commands::Cat { path, changes } => {
                self.stage_plan(changes.as_deref())?;
                self.runtime.block_on(self.session.open_document(path))
            }
            Commands::Status => {
                let status = self.runtime.block_on(self.session.status())?;
                Ok(format::format_status_text(&status))
            }
            Commands::Branches => {
                let branches = self.runtime.block_on(self.session.branches())?;
                Ok(format::format_branches_text(&branches))
            }
            Commands::Search { query, content } => {
                let kind = if *content {
                    SearchKind::Content
                } else {
                    SearchKind::Filename
                };
                let results = self.runtime.block_on(self.session.search(query, kind))?;
                Ok(format::format_search_text(query, &results))
            }
            Commands::Resolve {
                reference,
                document,
                asset,
            } => Ok(if *asset {
                self.session.resolve_asset(reference, document.as_deref())
            } else {
                self.session.resolve_link(reference, document.as_deref())
            }),
            Commands::Commit {
                changes,
                message,
                dry_run,
            } => {
                let staged = self.stage_plan(Some(changes.as_path()))?;
                if *dry_run {
                    return Self::dry_run(&staged, message);
                }
                let result = self.runtime.block_on(self.session.commit(message))?;
                Ok(format::format_commit_text(&result))
            }
        }
    }

    /// Replace the session's staged changes with the plan in `file`.
    fn stage_plan(&self, file: Option<&Path>) -> Result<Vec<PendingChange>, ApiError> {
        let store = self.session.store();
        store.clear_changes();
        let Some(file) = file else {
            return Ok(Vec::new());
        };
        for change in load_change_plan(file)? {
            store.add_change(change);
        }
        info!(file = %file.display(), staged = store.len(), "Change plan staged");
        Ok(store.get_changes())
    }

    fn dry_run(changes: &[PendingChange], message: &str) -> Result<String, ApiError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }
        if changes.is_empty() {
            return Err(ValidationError::NoChanges.into());
        }
        let mut ops = CommitPipeline::plan(changes);
        ops.push(RemoteOp::Commit {
            message: message.to_string(),
        });
        debug!(calls = ops.len(), "Dry run");
        Ok(format::format_plan_text(&ops, changes))
    }
}
