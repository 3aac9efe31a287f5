//! Run diagnostics
//!
//! Non-fatal events collected during a pass and surfaced at the end of the run.
//! Each event is logged when recorded; the CLI decides afterwards whether the
//! run counts as failed.

use crate::types::Inode;
use serde::Serialize;
use std::fmt;
use tracing::{error, warn};

/// Diagnostic kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// One candidate inode of a file entry is gone; the next candidate is tried
    MissingInode,
    /// No candidate inode of a file entry exists; the entry is dropped
    UnknownSource,
    /// The stat pass found something that is neither a file nor a directory
    UnsupportedKind,
}

/// Severity used for logging and summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::UnknownSource => Severity::Error,
            DiagnosticKind::MissingInode | DiagnosticKind::UnsupportedKind => Severity::Warning,
        }
    }
}

/// One recorded event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inode: Option<Inode>,
    /// Byte offset in the rename script, for events raised by the parser
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind.severity() {
            Severity::Warning => "warn",
            Severity::Error => "err",
        };
        match self.kind {
            DiagnosticKind::MissingInode => write!(
                f,
                "{}: {}: missing inode={}",
                label,
                self.path,
                self.inode.unwrap_or_default()
            ),
            DiagnosticKind::UnknownSource => write!(f, "{}: {}: source is missing", label, self.path),
            DiagnosticKind::UnsupportedKind => {
                write!(f, "{}: {}: unsupported file type", label, self.path)
            }
        }
    }
}

/// Accumulated diagnostics of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    events: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn missing_inode(&mut self, path: &str, inode: Inode, offset: usize) {
        warn!(path, inode, offset, "Missing inode, trying next candidate");
        self.events.push(Diagnostic {
            kind: DiagnosticKind::MissingInode,
            path: path.to_string(),
            inode: Some(inode),
            offset: Some(offset),
        });
    }

    pub fn unknown_source(&mut self, path: &str, offset: usize) {
        error!(path, offset, "No candidate inode found, entry skipped");
        self.events.push(Diagnostic {
            kind: DiagnosticKind::UnknownSource,
            path: path.to_string(),
            inode: None,
            offset: Some(offset),
        });
    }

    pub fn unsupported_kind(&mut self, path: &str, inode: Inode) {
        warn!(path, inode, "Unsupported file type in snapshot");
        self.events.push(Diagnostic {
            kind: DiagnosticKind::UnsupportedKind,
            path: path.to_string(),
            inode: Some(inode),
            offset: None,
        });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.events.extend(other.events);
    }

    pub fn events(&self) -> &[Diagnostic] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn has_errors(&self) -> bool {
        self.events
            .iter()
            .any(|e| e.kind.severity() == Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_severity() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.missing_inode("a/b.txt", 12, 40);
        diagnostics.unknown_source("a/b.txt", 40);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.count(DiagnosticKind::MissingInode), 1);
        assert_eq!(diagnostics.count(DiagnosticKind::UnknownSource), 1);
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn test_display() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.missing_inode("x", 7, 0);
        diagnostics.unsupported_kind("sock", 9);
        let lines: Vec<String> = diagnostics.events().iter().map(|e| e.to_string()).collect();
        assert_eq!(lines, vec!["warn: x: missing inode=7", "warn: sock: unsupported file type"]);
        assert!(!diagnostics.has_errors());
    }
}
