//! Content groups declared by a rename script

use crate::types::Inode;
use std::collections::{HashMap, HashSet};

/// Union-find over inodes listed together in file entries.
///
/// Every inode list in the script names files with the same content, so the
/// lists are merged into groups. A group remembers whether one of its files
/// was already emitted.
#[derive(Debug, Default)]
pub struct InodeGroups {
    parent: HashMap<Inode, Inode>,
    emitted: HashSet<Inode>,
}

impl InodeGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&mut self, inode: Inode) -> Inode {
        let mut root = inode;
        while let Some(&next) = self.parent.get(&root) {
            if next == root {
                break;
            }
            root = next;
        }
        // path compression
        let mut current = inode;
        while current != root {
            let next = self.parent.get(&current).copied().unwrap_or(root);
            self.parent.insert(current, root);
            current = next;
        }
        self.parent.entry(root).or_insert(root);
        root
    }

    pub fn union(&mut self, a: Inode, b: Inode) -> Inode {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return ra;
        }
        self.parent.insert(rb, ra);
        if self.emitted.remove(&rb) {
            self.emitted.insert(ra);
        }
        ra
    }

    /// Merge all of `inodes` into one group and return its root.
    pub fn join(&mut self, inodes: &[Inode]) -> Option<Inode> {
        let (&first, rest) = inodes.split_first()?;
        let mut root = self.find(first);
        for &inode in rest {
            root = self.union(root, inode);
        }
        Some(root)
    }

    /// Mark `inode`'s group as emitted. Returns whether it already was.
    pub fn mark_emitted(&mut self, inode: Inode) -> bool {
        let root = self.find(inode);
        !self.emitted.insert(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_merges_lists() {
        let mut groups = InodeGroups::new();
        groups.join(&[1, 2]);
        groups.join(&[3, 4]);
        assert_ne!(groups.find(1), groups.find(3));
        groups.join(&[2, 4]);
        assert_eq!(groups.find(1), groups.find(3));
        assert_eq!(groups.join(&[]), None);
    }

    #[test]
    fn test_emitted_survives_union() {
        let mut groups = InodeGroups::new();
        groups.join(&[1]);
        groups.join(&[2]);
        assert!(!groups.mark_emitted(2));
        groups.union(1, 2);
        assert!(groups.mark_emitted(1));
    }
}
