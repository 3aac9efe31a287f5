//! Path builders installed by script commands

use crate::pipeline::pattern::Pattern;
use crate::script::is_valid_name;
use crate::types::DirChain;
use std::fmt::Debug;

/// What a chain describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainKind {
    Directory,
    File,
}

/// Result of one builder step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Changed(DirChain),
    Unchanged,
    /// The entry must not be created; remaining builders are not run
    Skip,
}

/// One transformation step of a destination chain.
pub trait PathBuilder: Debug {
    fn build(&mut self, chain: &[Vec<u8>], kind: ChainKind) -> Outcome;
}

/// Collapse everything below `depth` segments into one directory level.
#[derive(Debug, Clone)]
pub struct Flatten {
    depth: usize,
}

impl Flatten {
    pub fn new(depth: usize) -> Self {
        Self { depth }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl PathBuilder for Flatten {
    fn build(&mut self, chain: &[Vec<u8>], kind: ChainKind) -> Outcome {
        match kind {
            ChainKind::Directory if chain.len() > self.depth => Outcome::Skip,
            ChainKind::Directory => Outcome::Unchanged,
            ChainKind::File if chain.len() <= self.depth + 1 => Outcome::Unchanged,
            ChainKind::File => {
                let mut flat = chain[..self.depth].to_vec();
                flat.extend(chain.last().cloned());
                Outcome::Changed(flat)
            }
        }
    }
}

/// Rewrite file names through a [`Pattern`].
#[derive(Debug, Clone)]
pub struct ApplyPattern {
    pattern: Pattern,
}

impl ApplyPattern {
    pub fn new(pattern: Pattern) -> Self {
        Self { pattern }
    }
}

impl PathBuilder for ApplyPattern {
    fn build(&mut self, chain: &[Vec<u8>], kind: ChainKind) -> Outcome {
        let (ChainKind::File, Some(name)) = (kind, chain.last()) else {
            return Outcome::Unchanged;
        };
        let mut expanded = self.pattern.expand(name);
        for b in expanded.iter_mut() {
            if *b == b'/' || *b == 0 {
                *b = b'_';
            }
        }
        if !is_valid_name(&expanded) || expanded == *name {
            return Outcome::Unchanged;
        }
        let mut out = chain.to_vec();
        if let Some(last) = out.last_mut() {
            *last = expanded;
        }
        Outcome::Changed(out)
    }
}

/// Replace non-printable and whitespace bytes with `_`.
///
/// Applies to the entry's own name and to every ancestor segment at or below
/// `from`, the depth of the block that declared the filter. Segments above it
/// belong to directories created before the filter was active.
#[derive(Debug, Clone)]
pub struct AsciiFilter {
    from: usize,
}

impl AsciiFilter {
    pub fn new(from: usize) -> Self {
        Self { from }
    }

    fn filter(segment: &[u8]) -> Vec<u8> {
        segment
            .iter()
            .map(|&b| if b.is_ascii_graphic() { b } else { b'_' })
            .collect()
    }
}

impl PathBuilder for AsciiFilter {
    fn build(&mut self, chain: &[Vec<u8>], _kind: ChainKind) -> Outcome {
        let last = chain.len().saturating_sub(1);
        let mut changed = false;
        let out: DirChain = chain
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                if i < self.from && i != last {
                    return segment.clone();
                }
                let filtered = Self::filter(segment);
                changed |= filtered != *segment;
                filtered
            })
            .collect();
        if changed {
            Outcome::Changed(out)
        } else {
            Outcome::Unchanged
        }
    }
}
