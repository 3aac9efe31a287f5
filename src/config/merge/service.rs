//! MergeService: orchestrates sources, applies merge policy, deserializes to RelinkConfig.

use crate::config::sources::{environment, workspace_file};
use crate::config::RelinkConfig;
use config::{ConfigError, File};
use std::path::Path;
use tracing::debug;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from the working directory and environment.
    /// Precedence: defaults (lowest) -> workspace file -> environment (highest).
    pub fn load(workspace_root: &Path) -> Result<RelinkConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder)?;

        let config: RelinkConfig = builder.build()?.try_deserialize()?;
        debug!(root = %workspace_root.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load config from a specific file with environment overlay. The file
    /// must exist.
    pub fn load_from_file(path: &Path) -> Result<RelinkConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = builder.add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder)?;

        let config: RelinkConfig = builder.build()?.try_deserialize()?;
        debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }
}
