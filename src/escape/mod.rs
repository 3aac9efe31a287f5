//! Escaping
//!
//! Two independent dialects: the script dialect used to store raw file names
//! inside a rename script, and the shell dialect used when rendering the final
//! `mkdir`/`ln` commands.

pub mod script;
pub mod shell;

pub use script::{escape, escape_quoted, unescape};
pub use shell::{hard_escape, shell_escape, shell_unescape, HARDENED_PREAMBLE};
