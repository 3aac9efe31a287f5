//! Snapshot Tree
//!
//! Immutable-after-build image of a directory hierarchy. Nodes live in an arena
//! addressed by [`NodeId`]; parents are stored as ids, so path reconstruction
//! walks the arena without borrowing hazards.

pub mod hasher;
pub mod node;
pub mod provider;
pub mod visitor;

pub use node::{EntryKind, Node, NodeKind};
pub use provider::{EntryStat, FsProvider, MemoryProvider, ProviderEntry, SnapshotProvider};
pub use visitor::Visitor;

use crate::diagnostics::Diagnostics;
use crate::error::SnapshotError;
use crate::types::{DirChain, Inode, NodeId};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Inode → file node lookup used when replaying a rename script
pub type InodeMap = HashMap<Inode, NodeId>;

/// Arena-backed snapshot of a directory tree
#[derive(Debug, Clone)]
pub struct Snapshot {
    root_path: PathBuf,
    nodes: Vec<Node>,
}

impl Snapshot {
    /// Id of the root directory
    pub const ROOT: NodeId = 0;

    /// Build a snapshot of `root` by listing it recursively.
    ///
    /// The root must be a readable directory. Nested directories that cannot be
    /// listed are logged and kept as empty directories. Entries that are neither
    /// files nor directories are skipped.
    pub fn build(provider: &dyn SnapshotProvider, root: &Path) -> Result<Self, SnapshotError> {
        let stat = provider.stat(root).map_err(|source| SnapshotError::IoError {
            path: root.to_path_buf(),
            source,
        })?;
        if stat.kind != EntryKind::Directory {
            return Err(SnapshotError::NotADirectory(root.to_path_buf()));
        }
        provider.list(root).map_err(|source| SnapshotError::IoError {
            path: root.to_path_buf(),
            source,
        })?;

        let mut snapshot = Snapshot {
            root_path: root.to_path_buf(),
            nodes: vec![Node {
                id: Self::ROOT,
                name: Vec::new(),
                parent: None,
                inode: None,
                len: 0,
                kind: NodeKind::Directory {
                    children: Vec::new(),
                },
            }],
        };
        snapshot.build_dir(provider, Self::ROOT);

        info!(
            root = %root.display(),
            nodes = snapshot.nodes.len(),
            "Snapshot built"
        );
        Ok(snapshot)
    }

    fn build_dir(&mut self, provider: &dyn SnapshotProvider, id: NodeId) {
        let path = self.source_path(id);
        let entries = match provider.list(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot list directory, treating as empty");
                return;
            }
        };

        let mut children = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.name == b"." || entry.name == b".." {
                continue;
            }
            let kind = match entry.kind {
                EntryKind::Directory => NodeKind::Directory {
                    children: Vec::new(),
                },
                EntryKind::File => NodeKind::File,
                EntryKind::Other => {
                    debug!(
                        name = %String::from_utf8_lossy(&entry.name),
                        "Skipping unsupported entry"
                    );
                    continue;
                }
            };
            let child = self.nodes.len();
            self.nodes.push(Node {
                id: child,
                name: entry.name,
                parent: Some(id),
                inode: None,
                len: 0,
                kind,
            });
            children.push(child);
        }

        if let NodeKind::Directory { children: slot } = &mut self.nodes[id].kind {
            *slot = children.clone();
        }
        for child in children {
            if self.nodes[child].is_dir() {
                self.build_dir(provider, child);
            }
        }
    }

    /// Resolve inode and length of every node.
    ///
    /// A stat failure is fatal. A node whose kind is no longer a plain file or
    /// directory is reported as a diagnostic and otherwise kept.
    pub fn stat_pass(
        &mut self,
        provider: &dyn SnapshotProvider,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), SnapshotError> {
        for id in 0..self.nodes.len() {
            let path = self.source_path(id);
            let stat = provider
                .stat(&path)
                .map_err(|source| SnapshotError::IoError { path, source })?;
            let node = &mut self.nodes[id];
            node.inode = Some(stat.inode);
            node.len = stat.len;
            let expected = if node.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            if stat.kind != expected {
                diagnostics.unsupported_kind(&self.display_path(id), stat.inode);
            }
        }
        debug!(nodes = self.nodes.len(), "Stat pass complete");
        Ok(())
    }

    /// Map inode → first file node carrying it (hard links resolve to the first
    /// occurrence in traversal order).
    pub fn inode_map(&self) -> InodeMap {
        let mut map = InodeMap::new();
        for id in self.preorder() {
            let node = &self.nodes[id];
            if let (true, Some(inode)) = (node.is_file(), node.inode) {
                map.entry(inode).or_insert(id);
            }
        }
        map
    }

    /// Node ids in traversal order.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id].children().iter().rev());
        }
        out
    }

    /// Run `visitor` over the tree in pre-order.
    pub fn traverse<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<(), V::Error> {
        visitor::walk(self, Self::ROOT, visitor)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Name segments from the root (exclusive) down to `id`.
    pub fn chain(&self, id: NodeId) -> DirChain {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = &self.nodes[cur];
            if node.parent.is_some() {
                chain.push(node.name.clone());
            }
            current = node.parent;
        }
        chain.reverse();
        chain
    }

    /// `/`-joined path relative to the snapshot root; empty for the root.
    pub fn path(&self, id: NodeId) -> Vec<u8> {
        crate::types::join_chain(&self.chain(id))
    }

    pub fn display_path(&self, id: NodeId) -> String {
        String::from_utf8_lossy(&self.path(id)).into_owned()
    }

    /// Location of `id` on the provider side.
    pub fn source_path(&self, id: NodeId) -> PathBuf {
        let rel = self.path(id);
        if rel.is_empty() {
            self.root_path.clone()
        } else {
            self.root_path.join(OsStr::from_bytes(&rel))
        }
    }
}
