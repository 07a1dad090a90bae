//! Global config file source: `$XDG_CONFIG_HOME/folio/config.toml`, optional.

use crate::config::paths;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let Ok(path) = paths::global_config_file() else {
        return Ok(builder);
    };
    let Some(name) = path.to_str() else {
        return Ok(builder);
    };
    Ok(builder.add_source(File::new(name, FileFormat::Toml).required(false)))
}
