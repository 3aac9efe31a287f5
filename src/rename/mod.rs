//! Rename records
//!
//! Apply mode replays a rename script against a fresh snapshot and produces an
//! ordered list of directory creations and hard links.

pub mod apply;
pub mod groups;
pub mod shell;

pub use apply::RenameApplier;
pub use groups::InodeGroups;
pub use shell::ShellRenderer;

use crate::diagnostics::Diagnostics;
use crate::error::ScriptError;
use crate::script::parse_script;
use crate::tree::Snapshot;
use crate::types::DirChain;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordFlags {
    /// Content already emitted by an earlier record
    pub duplicate: bool,
    /// Emit the duplicate anyway
    pub keep: bool,
}

/// One output operation: `mkdir` when `source` is `None`, `ln` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRecord {
    pub source: Option<PathBuf>,
    pub destination: DirChain,
    pub flags: RecordFlags,
}

impl RenameRecord {
    pub fn is_directory(&self) -> bool {
        self.source.is_none()
    }

    /// Whether the record is written as a comment.
    pub fn is_commented(&self) -> bool {
        self.flags.duplicate && !self.flags.keep
    }
}

/// Result of an apply pass
#[derive(Debug, Default)]
pub struct RenameOutput {
    pub records: Vec<RenameRecord>,
    pub diagnostics: Diagnostics,
}

/// Parse `script` against `snapshot` and collect the rename records.
///
/// A grammar or pipeline error discards everything computed so far.
pub fn apply_script(
    script: &[u8],
    snapshot: &Snapshot,
    max_duplicates: u32,
) -> Result<RenameOutput, ScriptError> {
    let mut applier = RenameApplier::new(snapshot, max_duplicates);
    parse_script(script, &mut applier)?;
    let (records, diagnostics) = applier.into_parts();
    info!(
        records = records.len(),
        diagnostics = diagnostics.len(),
        "Applied rename script"
    );
    Ok(RenameOutput {
        records,
        diagnostics,
    })
}
