//! Hash pass over a snapshot

use crate::error::SnapshotError;
use crate::tree::hasher::{hash_reader, short_hash};
use crate::tree::{Snapshot, SnapshotProvider, Visitor};
use crate::types::{Digest, NodeId};
use tracing::{debug, info};

/// Hash of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub node: NodeId,
    pub digest: Digest,
    pub short_hash: String,
}

struct HashVisitor<'a> {
    provider: &'a dyn SnapshotProvider,
    short_len: usize,
    records: Vec<ContentRecord>,
}

impl Visitor for HashVisitor<'_> {
    type Error = SnapshotError;

    fn dir_open(&mut self, _snapshot: &Snapshot, _id: NodeId) -> Result<(), SnapshotError> {
        Ok(())
    }

    fn file(&mut self, snapshot: &Snapshot, id: NodeId) -> Result<(), SnapshotError> {
        let path = snapshot.source_path(id);
        let digest = {
            let mut reader = self
                .provider
                .open(&path)
                .map_err(|source| SnapshotError::IoError {
                    path: path.clone(),
                    source,
                })?;
            hash_reader(&mut *reader).map_err(|source| SnapshotError::IoError {
                path: path.clone(),
                source,
            })?
        };
        let short = short_hash(&digest, self.short_len);
        debug!(path = %path.display(), digest = %hex::encode(digest), short = %short, "Hashed file");
        self.records.push(ContentRecord {
            node: id,
            digest,
            short_hash: short,
        });
        Ok(())
    }
}

/// Hash every file of `snapshot` in traversal order.
///
/// A file that cannot be opened or read aborts the pass.
pub fn hash_pass(
    snapshot: &Snapshot,
    provider: &dyn SnapshotProvider,
    short_len: usize,
) -> Result<Vec<ContentRecord>, SnapshotError> {
    let mut visitor = HashVisitor {
        provider,
        short_len,
        records: Vec::new(),
    };
    snapshot.traverse(&mut visitor)?;
    info!(files = visitor.records.len(), "Hash pass complete");
    Ok(visitor.records)
}
