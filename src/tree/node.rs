//! Snapshot node types

use crate::types::{Inode, NodeId};

/// Filesystem entry kind as reported by a snapshot provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Symlinks, sockets, devices and anything else the snapshot does not model
    Other,
}

/// Node payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Children in listing order
    Directory { children: Vec<NodeId> },
    File,
}

/// Snapshot node stored in the arena
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// Raw path segment; empty for the root
    pub name: Vec<u8>,
    /// `None` only for the root
    pub parent: Option<NodeId>,
    /// Populated by the stat pass
    pub inode: Option<Inode>,
    /// File length from the stat pass
    pub len: u64,
    pub kind: NodeKind,
}

impl Node {
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File)
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Directory { children } => children,
            NodeKind::File => &[],
        }
    }
}
