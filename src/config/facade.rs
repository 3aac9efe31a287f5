//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::RelinkConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the working directory and environment.
    pub fn load(workspace_root: &Path) -> Result<RelinkConfig, ConfigError> {
        MergeService::load(workspace_root)
    }

    /// Load configuration from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<RelinkConfig, ConfigError> {
        MergeService::load_from_file(path)
    }
}
