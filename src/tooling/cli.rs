//! CLI Tooling
//!
//! Command-line interface for the two relink actions: `load` snapshots a tree
//! and writes a rename script, `apply` replays an edited script and prints the
//! resulting shell commands.

use crate::config::{ConfigLoader, RelinkConfig};
use crate::diagnostics::Diagnostics;
use crate::error::ApiError;
use crate::index::{hash_pass, ContentIndex};
use crate::rename::{apply_script, ShellRenderer};
use crate::script::render_script;
use crate::tooling::format::{format_load_json, format_load_text, LoadReport};
use crate::tree::{FsProvider, Snapshot, SnapshotProvider};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Relink CLI - deduplicate and reorganize a tree through hard-link scripts
#[derive(Parser, Debug)]
#[command(name = "relink")]
#[command(about = "Deduplicate and reorganize a directory tree through generated hard-link scripts")]
pub struct Cli {
    /// Action to run
    #[arg(value_enum)]
    pub action: Action,

    /// Rename script path (default: .rename)
    #[arg(long)]
    pub rename_file: Option<PathBuf>,

    /// Directory tree to snapshot (default: .renameRepo)
    #[arg(long)]
    pub rename_repo: Option<PathBuf>,

    /// Exit successfully even when diagnostics were recorded
    #[arg(long)]
    pub force: bool,

    /// Output root prepended to every destination
    #[arg(long)]
    pub prefix: Option<String>,

    /// Escape names the shell cannot quote with printf octal dumps
    #[arg(long)]
    pub hardened: bool,

    /// Summary format for `load`
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Configuration file path (overrides relink.toml lookup)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Snapshot the tree and write a rename script
    Load,
    /// Replay the rename script and print shell commands
    Apply,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Load configuration for `cli` and fold its flags on top.
pub fn resolve_config(cli: &Cli, workspace_root: &Path) -> Result<RelinkConfig, ApiError> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load(workspace_root)?,
    };
    if let Some(p) = &cli.rename_file {
        config.rename_file = p.clone();
    }
    if let Some(p) = &cli.rename_repo {
        config.rename_repo = p.clone();
    }
    if let Some(prefix) = &cli.prefix {
        config.prefix = prefix.clone();
    }
    config.force |= cli.force;
    config.hardened |= cli.hardened;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }
    if let Some(output) = &cli.log_output {
        config.logging.output = output.clone();
    }
    if let Some(file) = &cli.log_file {
        config.logging.file = Some(file.clone());
    }
    config.validate()?;
    Ok(config)
}

/// Output of one action
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Text for stdout: the load summary or the shell script
    pub output: String,
    pub diagnostics: Diagnostics,
}

impl ExecutionReport {
    /// Whether the run counts as failed under `force`.
    pub fn failed(&self, force: bool) -> bool {
        !force && !self.diagnostics.is_empty()
    }
}

/// CLI context holding the resolved configuration
pub struct CliContext {
    config: RelinkConfig,
    workspace_root: PathBuf,
    format: OutputFormat,
    provider: Box<dyn SnapshotProvider>,
}

impl CliContext {
    /// Create a context for the current working directory.
    pub fn new(cli: &Cli) -> Result<Self, ApiError> {
        let workspace_root = std::env::current_dir().map_err(|source| ApiError::IoError {
            path: PathBuf::from("."),
            source,
        })?;
        let config = resolve_config(cli, &workspace_root)?;
        Ok(Self::with_config(config, workspace_root, cli.format))
    }

    /// Create a context from an already resolved configuration.
    pub fn with_config(config: RelinkConfig, workspace_root: PathBuf, format: OutputFormat) -> Self {
        Self {
            config,
            workspace_root,
            format,
            provider: Box::new(FsProvider::new()),
        }
    }

    pub fn config(&self) -> &RelinkConfig {
        &self.config
    }

    /// Execute an action
    pub fn execute(&self, action: Action) -> Result<ExecutionReport, ApiError> {
        let started = Instant::now();
        let report = match action {
            Action::Load => self.load()?,
            Action::Apply => self.apply()?,
        };
        info!(
            action = ?action,
            diagnostics = report.diagnostics.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Action complete"
        );
        Ok(report)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }

    fn snapshot(&self, diagnostics: &mut Diagnostics) -> Result<Snapshot, ApiError> {
        let repo = self.resolve(&self.config.rename_repo);
        let repo = dunce::canonicalize(&repo).map_err(|source| ApiError::IoError {
            path: repo.clone(),
            source,
        })?;
        let mut snapshot = Snapshot::build(self.provider.as_ref(), &repo)?;
        snapshot.stat_pass(self.provider.as_ref(), diagnostics)?;
        Ok(snapshot)
    }

    fn load(&self) -> Result<ExecutionReport, ApiError> {
        let mut diagnostics = Diagnostics::new();
        let snapshot = self.snapshot(&mut diagnostics)?;
        let records = hash_pass(
            &snapshot,
            self.provider.as_ref(),
            self.config.effective_short_hash_len(),
        )?;
        let index = ContentIndex::group_duplicates(records);
        let script = render_script(&snapshot, &index);

        let rename_file = self.resolve(&self.config.rename_file);
        std::fs::write(&rename_file, script.as_bytes()).map_err(|source| ApiError::IoError {
            path: rename_file.clone(),
            source,
        })?;
        info!(path = %rename_file.display(), bytes = script.len(), "Wrote rename script");

        let report = LoadReport::new(rename_file.display().to_string(), &snapshot, &index);
        let output = match self.format {
            OutputFormat::Text => format_load_text(&report),
            OutputFormat::Json => format_load_json(&report),
        };
        Ok(ExecutionReport {
            output,
            diagnostics,
        })
    }

    fn apply(&self) -> Result<ExecutionReport, ApiError> {
        let rename_file = self.resolve(&self.config.rename_file);
        let script = std::fs::read(&rename_file).map_err(|source| ApiError::IoError {
            path: rename_file.clone(),
            source,
        })?;

        let mut diagnostics = Diagnostics::new();
        let snapshot = self.snapshot(&mut diagnostics)?;
        let applied = apply_script(&script, &snapshot, self.config.max_duplicates)?;
        diagnostics.extend(applied.diagnostics);

        let renderer = ShellRenderer::new(self.config.prefix.clone(), self.config.hardened);
        let output = renderer.render(&applied.records)?;
        Ok(ExecutionReport {
            output,
            diagnostics,
        })
    }
}
