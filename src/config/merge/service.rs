//! MergeService: orchestrates sources, applies merge policy, deserializes to FolioConfig.

use crate::config::sources::{environment, explicit_file, global_file};
use crate::config::FolioConfig;
use crate::error::ApiError;
use std::path::Path;
use tracing::debug;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> global file -> explicit file -> environment (highest).
    pub fn load(explicit: Option<&Path>) -> Result<FolioConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = match explicit {
            Some(path) => explicit_file::add_to_builder(builder, path)?,
            None => builder,
        };
        let builder = environment::add_to_builder(builder)?;

        let config: FolioConfig = builder.build()?.try_deserialize()?;
        debug!(base_url = %config.remote.base_url, "Configuration loaded");
        Ok(config)
    }
}
