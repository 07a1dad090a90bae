//! Built-in defaults every configuration build starts from.

use crate::config::{default_asset_prefix, default_base_url, default_timeout_secs};
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};

/// Builder seeded with defaults so partially-specified files still deserialize.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("remote.base_url", default_base_url())?
        .set_default("remote.timeout_secs", default_timeout_secs())?
        .set_default("remote.asset_prefix", default_asset_prefix())
}
