//! Error types for every layer of the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the script and shell escaping dialects
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EscapeError {
    #[error("invalid UTF-8 at byte {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("control character U+{code:04X} cannot be shell-escaped without hardening")]
    ControlCharacter { code: u32 },

    #[error("dangling backslash at end of input")]
    TrailingBackslash,

    #[error("malformed \\x escape at byte {offset}")]
    InvalidHexEscape { offset: usize },
}

/// Errors from the filename pattern mini-parser
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern ends with an unfinished wildcard")]
    TrailingPercent,

    #[error("unknown wildcard character '{0}'")]
    UnknownWildcard(char),

    #[error("wildcard width is too large")]
    WidthOverflow,
}

/// What went wrong at a grammar error position
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarErrorKind {
    #[error("expected '{expected}', found '{found}'")]
    UnexpectedChar { expected: char, found: char },

    #[error("unexpected character '{0}'")]
    Unexpected(char),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("directory block is not closed")]
    UnterminatedBlock,

    #[error("'}}' without a matching '{{'")]
    StrayClose,

    #[error("commands are only allowed before the first entry of a block")]
    CommandAfterEntry,

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("command '{0}' requires an argument")]
    MissingArgument(String),

    #[error("command '{0}' takes no argument")]
    UnexpectedArgument(String),

    #[error("quoted name is not closed")]
    UnterminatedQuote,

    #[error("invalid name '{0}'")]
    InvalidName(String),

    #[error("invalid inode number")]
    InvalidInode,

    #[error("invalid escape sequence: {0}")]
    InvalidEscape(EscapeError),

    #[error("invalid pattern: {0}")]
    InvalidPattern(PatternError),
}

/// Fatal error in the rename-script text, with the byte offset it was detected at
#[derive(Debug, Error, PartialEq, Eq)]
#[error("grammar error at byte {offset}: {kind}")]
pub struct GrammarError {
    pub offset: usize,
    pub kind: GrammarErrorKind,
}

impl GrammarError {
    pub fn new(offset: usize, kind: GrammarErrorKind) -> Self {
        Self { offset, kind }
    }
}

/// Errors from the path-building pipeline
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("too many duplicates for '{path}' (limit {limit})")]
    TooManyDuplicates { path: String, limit: u32 },

    #[error("directory '{path}' collides with a file emitted earlier")]
    DirectoryOverFile { path: String },
}

/// Errors that abort a script parse pass
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Errors from building, stating and hashing a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot root is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Top-level error surfaced by the CLI context
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("{0} (rerun with --hardened to escape arbitrary bytes)")]
    Escape(#[from] EscapeError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
