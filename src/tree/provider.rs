//! Snapshot providers
//!
//! A provider is the only place the snapshot touches the outside world:
//! directory listing, stat and opening files for hashing.

use crate::tree::node::EntryKind;
use crate::types::Inode;
use std::collections::{HashMap, HashSet};
use std::io::{self, Read};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEntry {
    pub name: Vec<u8>,
    pub kind: EntryKind,
}

/// Result of a stat call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStat {
    pub inode: Inode,
    pub kind: EntryKind,
    pub len: u64,
}

/// Source of directory listings, stat results and file contents
pub trait SnapshotProvider {
    /// List the direct children of `dir` in the provider's natural order.
    fn list(&self, dir: &Path) -> io::Result<Vec<ProviderEntry>>;

    /// Stat `path` without following symlinks.
    fn stat(&self, path: &Path) -> io::Result<EntryStat>;

    /// Open `path` for reading. The reader is dropped as soon as hashing ends.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;
}

/// Provider backed by the local filesystem. Entries are listed in file-name
/// order so repeated snapshots of an unchanged tree are identical.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsProvider;

impl FsProvider {
    pub fn new() -> Self {
        FsProvider
    }
}

impl SnapshotProvider for FsProvider {
    fn list(&self, dir: &Path) -> io::Result<Vec<ProviderEntry>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            let file_type = entry.file_type();
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                EntryKind::Other
            };
            entries.push(ProviderEntry {
                name: entry.file_name().as_bytes().to_vec(),
                kind,
            });
        }
        Ok(entries)
    }

    fn stat(&self, path: &Path) -> io::Result<EntryStat> {
        let metadata = std::fs::symlink_metadata(path)?;
        let file_type = metadata.file_type();
        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };
        Ok(EntryStat {
            inode: metadata.ino(),
            kind,
            len: metadata.len(),
        })
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(std::fs::File::open(path)?))
    }
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    kind: EntryKind,
    inode: Inode,
    content: Vec<u8>,
}

/// In-memory provider for tests and for embedders that already hold a listing.
///
/// Paths passed to the builder methods are relative to the root and use `/`.
/// Inodes are assigned in insertion order starting at 2 (the root is 1).
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    root: PathBuf,
    entries: HashMap<PathBuf, MemoryEntry>,
    children: HashMap<PathBuf, Vec<Vec<u8>>>,
    unreadable: HashSet<PathBuf>,
    next_inode: Inode,
}

impl MemoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let mut entries = HashMap::new();
        entries.insert(
            root.clone(),
            MemoryEntry {
                kind: EntryKind::Directory,
                inode: 1,
                content: Vec::new(),
            },
        );
        let mut children = HashMap::new();
        children.insert(root.clone(), Vec::new());
        Self {
            root,
            entries,
            children,
            unreadable: HashSet::new(),
            next_inode: 2,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add a directory (and any missing parents).
    pub fn with_dir(mut self, rel: &str) -> Self {
        let path = self.root.join(rel);
        self.ensure_dir(&path);
        self
    }

    /// Add a regular file with a fresh inode.
    pub fn with_file(mut self, rel: &str, content: &[u8]) -> Self {
        let inode = self.alloc_inode();
        self.insert(rel, EntryKind::File, inode, content.to_vec());
        self
    }

    /// Add a regular file with an explicit inode.
    pub fn with_file_inode(mut self, rel: &str, content: &[u8], inode: Inode) -> Self {
        self.insert(rel, EntryKind::File, inode, content.to_vec());
        self
    }

    /// Add a hard link to an existing file: same inode, same content.
    pub fn with_link(mut self, rel: &str, target: &str) -> Self {
        let target = self.root.join(target);
        if let Some(entry) = self.entries.get(&target).cloned() {
            self.insert(rel, entry.kind, entry.inode, entry.content);
        }
        self
    }

    /// Add an entry of an unsupported kind (symlink, socket, ...).
    pub fn with_other(mut self, rel: &str) -> Self {
        let inode = self.alloc_inode();
        self.insert(rel, EntryKind::Other, inode, Vec::new());
        self
    }

    /// Make listing `rel` fail with a permission error.
    pub fn with_unreadable(mut self, rel: &str) -> Self {
        self.unreadable.insert(self.root.join(rel));
        self
    }

    fn alloc_inode(&mut self) -> Inode {
        let inode = self.next_inode;
        self.next_inode += 1;
        inode
    }

    fn insert(&mut self, rel: &str, kind: EntryKind, inode: Inode, content: Vec<u8>) {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            let parent = parent.to_path_buf();
            self.ensure_dir(&parent);
            self.attach(&parent, &path);
        }
        self.entries.insert(path, MemoryEntry { kind, inode, content });
    }

    fn ensure_dir(&mut self, path: &Path) {
        if self.entries.contains_key(path) {
            return;
        }
        if let Some(parent) = path.parent() {
            let parent = parent.to_path_buf();
            self.ensure_dir(&parent);
            self.attach(&parent, path);
        }
        let inode = self.alloc_inode();
        self.entries.insert(
            path.to_path_buf(),
            MemoryEntry {
                kind: EntryKind::Directory,
                inode,
                content: Vec::new(),
            },
        );
        self.children.insert(path.to_path_buf(), Vec::new());
    }

    fn attach(&mut self, parent: &Path, child: &Path) {
        let Some(name) = child.file_name() else {
            return;
        };
        let siblings = self.children.entry(parent.to_path_buf()).or_default();
        let name = name.as_bytes().to_vec();
        if !siblings.contains(&name) {
            siblings.push(name);
        }
    }
}

impl SnapshotProvider for MemoryProvider {
    fn list(&self, dir: &Path) -> io::Result<Vec<ProviderEntry>> {
        if self.unreadable.contains(dir) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "directory is not readable",
            ));
        }
        let names = self
            .children
            .get(dir)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such directory"))?;
        Ok(names
            .iter()
            .filter_map(|name| {
                let path = dir.join(std::ffi::OsStr::from_bytes(name));
                self.entries.get(&path).map(|entry| ProviderEntry {
                    name: name.clone(),
                    kind: entry.kind,
                })
            })
            .collect())
    }

    fn stat(&self, path: &Path) -> io::Result<EntryStat> {
        let entry = self
            .entries
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such entry"))?;
        Ok(EntryStat {
            inode: entry.inode,
            kind: entry.kind,
            len: entry.content.len() as u64,
        })
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        match self.entries.get(path) {
            Some(entry) if entry.kind == EntryKind::File => Ok(Box::new(entry.content.as_slice())),
            Some(_) => Err(io::Error::new(io::ErrorKind::InvalidInput, "not a file")),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such entry")),
        }
    }
}
