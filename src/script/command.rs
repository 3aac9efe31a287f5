//! Scoped script commands

use crate::pipeline::pattern::Pattern;

/// A command from the head of a directory block.
///
/// Commands stay active for the rest of the block, including nested blocks,
/// and are undone when the block closes.
#[derive(Debug, Clone)]
pub enum Command {
    /// Collapse every descendant of the block into the block's own directory
    Flatten,
    /// Rewrite file names with a wildcard pattern
    Pattern(Pattern),
    /// Replace non-printable and whitespace bytes in names with `_`
    Ascii,
    /// Emit duplicate files as real links instead of commented-out lines
    KeepDuplicates,
}

impl Command {
    /// Keyword used in the script text.
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Flatten => "flatten",
            Command::Pattern(_) => "pattern",
            Command::Ascii => "ascii",
            Command::KeepDuplicates => "keepdups",
        }
    }
}
