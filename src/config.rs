//! Configuration
//!
//! Settings are layered: built-in defaults, an optional `relink.toml` in the
//! working directory (or an explicit file), `RELINK_*` environment variables,
//! and finally command-line flags.

pub mod facade;
pub mod merge;
pub mod sources;

pub use facade::ConfigLoader;

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::pipeline::DEFAULT_MAX_DUPLICATES;
use crate::tree::hasher::{DEFAULT_SHORT_HASH_LEN, MAX_SHORT_HASH_LEN};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the optional configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "relink.toml";

/// Resolved configuration for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelinkConfig {
    /// Rename script written by `load` and read by `apply`
    pub rename_file: PathBuf,
    /// Directory tree to snapshot
    pub rename_repo: PathBuf,
    /// Output root prepended to every destination
    pub prefix: String,
    /// Succeed even when diagnostics were recorded
    pub force: bool,
    /// Fall back to `printf` escaping for names the shell cannot quote
    pub hardened: bool,
    /// Duplicate indices tried before a collision is fatal
    pub max_duplicates: u32,
    /// Characters of the base-32 digest shown in summaries
    pub short_hash_len: usize,
    pub logging: LoggingConfig,
}

impl Default for RelinkConfig {
    fn default() -> Self {
        Self {
            rename_file: PathBuf::from(".rename"),
            rename_repo: PathBuf::from(".renameRepo"),
            prefix: String::new(),
            force: false,
            hardened: false,
            max_duplicates: DEFAULT_MAX_DUPLICATES,
            short_hash_len: DEFAULT_SHORT_HASH_LEN,
            logging: LoggingConfig::default(),
        }
    }
}

impl RelinkConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.max_duplicates == 0 {
            return Err(ApiError::ConfigError(
                "max_duplicates must be at least 1".to_string(),
            ));
        }
        if self.short_hash_len == 0 {
            return Err(ApiError::ConfigError(
                "short_hash_len must be at least 1".to_string(),
            ));
        }
        if self.rename_file.as_os_str().is_empty() {
            return Err(ApiError::ConfigError("rename_file is empty".to_string()));
        }
        Ok(())
    }

    /// Short hash length capped to the encoded digest length.
    pub fn effective_short_hash_len(&self) -> usize {
        self.short_hash_len.min(MAX_SHORT_HASH_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelinkConfig::default();
        assert_eq!(config.rename_file, PathBuf::from(".rename"));
        assert_eq!(config.rename_repo, PathBuf::from(".renameRepo"));
        assert_eq!(config.max_duplicates, 1000);
        assert_eq!(config.short_hash_len, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_bounds_are_rejected() {
        let config = RelinkConfig {
            max_duplicates: 0,
            ..RelinkConfig::default()
        };
        assert!(matches!(config.validate(), Err(ApiError::ConfigError(_))));

        let config = RelinkConfig {
            short_hash_len: 0,
            ..RelinkConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_short_hash_len_is_capped() {
        let config = RelinkConfig {
            short_hash_len: 200,
            ..RelinkConfig::default()
        };
        assert_eq!(config.effective_short_hash_len(), 52);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RelinkConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "prefix = \"/out\"\n[logging]\nlevel = \"debug\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.prefix, "/out");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.output, "stderr");
        assert_eq!(config.max_duplicates, 1000);
    }
}
