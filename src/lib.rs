//! Relink: Content-Addressed Tree Rewriting
//!
//! Snapshots a directory tree, groups files by content, and replays an
//! operator-edited rename script into a shell script of `mkdir -p` and `ln`
//! commands. Source data is never moved or copied.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod escape;
pub mod index;
pub mod logging;
pub mod pipeline;
pub mod rename;
pub mod script;
pub mod tooling;
pub mod tree;
pub mod types;
