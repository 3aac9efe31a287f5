//! Pre-order traversal protocol over a snapshot

use crate::tree::node::NodeKind;
use crate::tree::Snapshot;
use crate::types::NodeId;

/// Callbacks invoked by [`Snapshot::traverse`].
///
/// Every `dir_open` is matched by a `dir_close` after the directory's whole
/// subtree has been visited, so consumers can emit bracketed output without
/// tracking depth themselves. The root directory is visited too.
pub trait Visitor {
    type Error;

    fn dir_open(&mut self, snapshot: &Snapshot, id: NodeId) -> Result<(), Self::Error>;

    fn dir_close(&mut self, _snapshot: &Snapshot, _id: NodeId) -> Result<(), Self::Error> {
        Ok(())
    }

    fn file(&mut self, snapshot: &Snapshot, id: NodeId) -> Result<(), Self::Error>;
}

pub(crate) fn walk<V: Visitor + ?Sized>(
    snapshot: &Snapshot,
    id: NodeId,
    visitor: &mut V,
) -> Result<(), V::Error> {
    match &snapshot.node(id).kind {
        NodeKind::File => visitor.file(snapshot, id),
        NodeKind::Directory { children } => {
            visitor.dir_open(snapshot, id)?;
            for &child in children {
                walk(snapshot, child, visitor)?;
            }
            visitor.dir_close(snapshot, id)
        }
    }
}
