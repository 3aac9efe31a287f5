//! Integration tests for relink

mod cli_parse;
mod discover_apply;
