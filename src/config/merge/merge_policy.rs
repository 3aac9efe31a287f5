//! Base layer of every configuration build

use crate::config::RelinkConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder seeded with the serialized defaults of [`RelinkConfig`].
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = Config::try_from(&RelinkConfig::default())?;
    Ok(Config::builder().add_source(defaults))
}
