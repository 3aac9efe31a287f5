//! Rename Scripts
//!
//! The text format an operator edits to describe the output layout:
//!
//! ```text
//! $pattern %n_%3N%.%e
//! photos {
//!     $flatten
//!     'summer 2019' {
//!         beach.jpg #1842|2210
//!     }
//! }
//! notes.txt #1907
//! ```
//!
//! Commands (`$...`) open a block and apply to everything inside it. Files
//! reference their source by inode; alternatives separated by `|` name other
//! files known to have the same content.

pub mod command;
pub mod cursor;
pub mod parser;
pub mod writer;

pub use command::Command;
pub use cursor::Cursor;
pub use parser::{parse_script, ScriptHandler};
pub use writer::render_script;

/// Whether `name` can be used as a single path segment.
pub fn is_valid_name(name: &[u8]) -> bool {
    !name.is_empty()
        && name != b"."
        && name != b".."
        && !name.iter().any(|&b| b == b'/' || b == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name(b"a.txt"));
        assert!(is_valid_name(b"..."));
        assert!(!is_valid_name(b""));
        assert!(!is_valid_name(b"."));
        assert!(!is_valid_name(b".."));
        assert!(!is_valid_name(b"a/b"));
        assert!(!is_valid_name(b"a\0b"));
    }
}
