//! Content Index
//!
//! Hashes every file of a snapshot and groups files with equal content. Each
//! group has exactly one representative (the first record seen for its hash in
//! traversal order); the remaining members form its duplicate chain.

pub mod groups;
pub mod hashing;

pub use groups::{ContentIndex, DuplicateGroup, GroupId, IndexSummary, RecordId};
pub use hashing::{hash_pass, ContentRecord};
