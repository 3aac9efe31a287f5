//! Registry of emitted destination chains

use crate::pipeline::transform::ChainKind;
use crate::types::DirChain;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct ChainEntry {
    kind: ChainKind,
    count: u32,
}

/// Occurrence count and owner kind per emitted destination chain.
///
/// Files and directories share one registry, so a file never lands on a path
/// already claimed by a directory and vice versa. The first emission decides
/// the kind of a chain.
#[derive(Debug, Default, Clone)]
pub struct DirChainSet {
    entries: HashMap<DirChain, ChainEntry>,
}

impl DirChainSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, chain: &[Vec<u8>]) -> bool {
        self.entries.contains_key(chain)
    }

    /// Kind of the entry that first claimed `chain`.
    pub fn kind(&self, chain: &[Vec<u8>]) -> Option<ChainKind> {
        self.entries.get(chain).map(|entry| entry.kind)
    }

    pub fn count(&self, chain: &[Vec<u8>]) -> u32 {
        self.entries.get(chain).map_or(0, |entry| entry.count)
    }

    /// Record one emission of `chain` and return its new count.
    pub fn record(&mut self, chain: &[Vec<u8>], kind: ChainKind) -> u32 {
        let entry = self
            .entries
            .entry(chain.to_vec())
            .or_insert(ChainEntry { kind, count: 0 });
        entry.count += 1;
        entry.count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
