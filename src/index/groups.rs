//! Duplicate grouping
//!
//! Records map to groups through an explicit `record → group` table instead of
//! linked representative pointers. Group members are kept in traversal order,
//! so member 0 is the representative and the rest is its chain.

use crate::index::hashing::ContentRecord;
use crate::tree::Snapshot;
use crate::types::{Inode, NodeId};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Index into [`ContentIndex::records`]
pub type RecordId = usize;

/// Index into [`ContentIndex::groups`]
pub type GroupId = usize;

/// Files sharing one short hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub short_hash: String,
    /// Traversal-ordered members; the first one is the representative
    pub members: Vec<RecordId>,
}

impl DuplicateGroup {
    pub fn representative(&self) -> RecordId {
        self.members[0]
    }

    /// Members after the representative
    pub fn chain(&self) -> &[RecordId] {
        &self.members[1..]
    }

    pub fn is_duplicated(&self) -> bool {
        self.members.len() > 1
    }
}

/// Counters describing a grouped snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    pub files: usize,
    pub duplicate_groups: usize,
    pub redundant_files: usize,
    pub reclaimable_bytes: u64,
}

/// Hashed files grouped by content
#[derive(Debug, Clone, Default)]
pub struct ContentIndex {
    records: Vec<ContentRecord>,
    group_of: Vec<GroupId>,
    groups: Vec<DuplicateGroup>,
    by_node: HashMap<NodeId, RecordId>,
}

impl ContentIndex {
    /// Group `records` (in traversal order) by short hash.
    pub fn group_duplicates(records: Vec<ContentRecord>) -> Self {
        let mut by_hash: HashMap<String, GroupId> = HashMap::new();
        let mut group_of = Vec::with_capacity(records.len());
        let mut groups: Vec<DuplicateGroup> = Vec::new();
        let mut by_node = HashMap::with_capacity(records.len());

        for (id, record) in records.iter().enumerate() {
            let group = *by_hash.entry(record.short_hash.clone()).or_insert_with(|| {
                groups.push(DuplicateGroup {
                    short_hash: record.short_hash.clone(),
                    members: Vec::new(),
                });
                groups.len() - 1
            });
            groups[group].members.push(id);
            group_of.push(group);
            by_node.insert(record.node, id);
        }

        let index = ContentIndex {
            records,
            group_of,
            groups,
            by_node,
        };
        debug!(
            records = index.records.len(),
            groups = index.groups.len(),
            "Grouped duplicates"
        );
        index
    }

    pub fn records(&self) -> &[ContentRecord] {
        &self.records
    }

    pub fn record(&self, id: RecordId) -> &ContentRecord {
        &self.records[id]
    }

    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    pub fn group(&self, id: GroupId) -> &DuplicateGroup {
        &self.groups[id]
    }

    pub fn group_of(&self, record: RecordId) -> GroupId {
        self.group_of[record]
    }

    pub fn record_for_node(&self, node: NodeId) -> Option<RecordId> {
        self.by_node.get(&node).copied()
    }

    /// Representative of `record`'s group, or `None` when `record` is the
    /// representative itself.
    pub fn representative(&self, record: RecordId) -> Option<RecordId> {
        let representative = self.groups[self.group_of[record]].representative();
        (representative != record).then_some(representative)
    }

    /// Groups with more than one member.
    pub fn duplicate_groups(&self) -> impl Iterator<Item = &DuplicateGroup> {
        self.groups.iter().filter(|g| g.is_duplicated())
    }

    /// Candidate inodes for a file: its own inode first, then the distinct
    /// inodes of the other members of its group in traversal order.
    pub fn alternatives(&self, snapshot: &Snapshot, node: NodeId) -> Vec<Inode> {
        let mut inodes: Vec<Inode> = snapshot.node(node).inode.into_iter().collect();
        let Some(record) = self.record_for_node(node) else {
            return inodes;
        };
        for &member in &self.groups[self.group_of[record]].members {
            if let Some(inode) = snapshot.node(self.records[member].node).inode {
                if !inodes.contains(&inode) {
                    inodes.push(inode);
                }
            }
        }
        inodes
    }

    /// Bytes freed by dropping every member but the representative. Hard links
    /// to an inode already counted in the group occupy no extra space.
    pub fn reclaimable_bytes(&self, snapshot: &Snapshot, group: &DuplicateGroup) -> u64 {
        let mut seen: Vec<Inode> = Vec::new();
        let mut total = 0;
        for (position, &member) in group.members.iter().enumerate() {
            let node = snapshot.node(self.records[member].node);
            if let Some(inode) = node.inode {
                if seen.contains(&inode) {
                    continue;
                }
                seen.push(inode);
            }
            if position > 0 {
                total += node.len;
            }
        }
        total
    }

    pub fn summary(&self, snapshot: &Snapshot) -> IndexSummary {
        let mut summary = IndexSummary {
            files: self.records.len(),
            ..IndexSummary::default()
        };
        for group in self.duplicate_groups() {
            summary.duplicate_groups += 1;
            summary.redundant_files += group.chain().len();
            summary.reclaimable_bytes += self.reclaimable_bytes(snapshot, group);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::index::hash_pass;
    use crate::tree::MemoryProvider;
    use std::path::Path;

    fn indexed(provider: &MemoryProvider) -> (Snapshot, ContentIndex) {
        let mut snapshot = Snapshot::build(provider, Path::new("/repo")).unwrap();
        snapshot
            .stat_pass(provider, &mut Diagnostics::new())
            .unwrap();
        let records = hash_pass(&snapshot, provider, 15).unwrap();
        let index = ContentIndex::group_duplicates(records);
        (snapshot, index)
    }

    #[test]
    fn test_three_identical_one_distinct() {
        let provider = MemoryProvider::new("/repo")
            .with_file("a.txt", b"same")
            .with_file("b.txt", b"other")
            .with_file("sub/c.txt", b"same")
            .with_file("sub/d.txt", b"same");
        let (_, index) = indexed(&provider);

        let duplicated: Vec<_> = index.duplicate_groups().collect();
        assert_eq!(duplicated.len(), 1);
        assert_eq!(duplicated[0].chain().len(), 2);
        assert_eq!(duplicated[0].representative(), 0);
        assert_eq!(index.groups().len(), 2);
    }

    #[test]
    fn test_representative_is_none_for_anchor() {
        let provider = MemoryProvider::new("/repo")
            .with_file("a.txt", b"same")
            .with_file("b.txt", b"same");
        let (_, index) = indexed(&provider);
        assert_eq!(index.representative(0), None);
        assert_eq!(index.representative(1), Some(0));
        assert_eq!(index.group_of(0), index.group_of(1));
    }

    #[test]
    fn test_short_hash_collisions_are_grouped() {
        let records = vec![
            ContentRecord {
                node: 1,
                digest: [1; 32],
                short_hash: "AAAA".to_string(),
            },
            ContentRecord {
                node: 2,
                digest: [2; 32],
                short_hash: "AAAA".to_string(),
            },
        ];
        let index = ContentIndex::group_duplicates(records);
        assert_eq!(index.groups().len(), 1);
        assert_eq!(index.record_for_node(2), Some(1));
    }

    #[test]
    fn test_alternatives_put_own_inode_first() {
        let provider = MemoryProvider::new("/repo")
            .with_file_inode("a.txt", b"same", 100)
            .with_file_inode("b.txt", b"same", 200)
            .with_link("c.txt", "a.txt")
            .with_file_inode("d.txt", b"other", 300);
        let (snapshot, index) = indexed(&provider);
        let node_of = |name: &[u8]| {
            snapshot
                .preorder()
                .into_iter()
                .find(|&id| snapshot.node(id).name == name)
                .unwrap()
        };
        assert_eq!(index.alternatives(&snapshot, node_of(b"b.txt")), vec![200, 100]);
        assert_eq!(index.alternatives(&snapshot, node_of(b"c.txt")), vec![100, 200]);
        assert_eq!(index.alternatives(&snapshot, node_of(b"d.txt")), vec![300]);
    }

    #[test]
    fn test_summary_counts_reclaimable_bytes() {
        let provider = MemoryProvider::new("/repo")
            .with_file("a.txt", b"12345")
            .with_file("b.txt", b"12345")
            .with_file("c.txt", b"12345")
            .with_file("d.txt", b"x");
        let (snapshot, index) = indexed(&provider);
        let summary = index.summary(&snapshot);
        assert_eq!(
            summary,
            IndexSummary {
                files: 4,
                duplicate_groups: 1,
                redundant_files: 2,
                reclaimable_bytes: 10,
            }
        );
    }

    #[test]
    fn test_hard_links_are_not_reclaimable() {
        let provider = MemoryProvider::new("/repo")
            .with_file("a.txt", b"12345")
            .with_link("b.txt", "a.txt")
            .with_file("c.txt", b"12345")
            .with_link("d.txt", "c.txt");
        let (snapshot, index) = indexed(&provider);
        let group = index.duplicate_groups().next().unwrap();
        assert_eq!(group.chain().len(), 3);
        assert_eq!(index.reclaimable_bytes(&snapshot, group), 5);
        assert_eq!(index.summary(&snapshot).reclaimable_bytes, 5);
    }
}
