//! Configuration
//!
//! Layered configuration: built-in defaults, then the global config file,
//! then an explicit config file, then `FOLIO__*` environment variables.

mod facade;
mod merge;
pub mod paths;
mod sources;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use crate::resolve::DEFAULT_ASSET_PREFIX;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Repository service connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the repository service (without the `/api` suffix)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Path prefix under which the service serves raw file content
    #[serde(default = "default_asset_prefix")]
    pub asset_prefix: String,

    /// Branch to browse; `None` browses whatever the service serves
    #[serde(default)]
    pub branch: Option<String>,
}

pub(crate) fn default_base_url() -> String {
    "http://localhost:4242".to_string()
}

pub(crate) fn default_timeout_secs() -> u64 {
    30
}

pub(crate) fn default_asset_prefix() -> String {
    DEFAULT_ASSET_PREFIX.to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            asset_prefix: default_asset_prefix(),
            branch: None,
        }
    }
}
