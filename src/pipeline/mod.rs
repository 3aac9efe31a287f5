//! Path-Building Pipeline
//!
//! Script commands install builders into priority slots. When an entry is
//! built, the top builder of every slot runs in slot order, threading the
//! destination chain through each step. Leaving a script block restores the
//! slots to their sizes at block entry.

pub mod chains;
pub mod pattern;
pub mod scope;
pub mod transform;

pub use chains::DirChainSet;
pub use pattern::Pattern;
pub use scope::{ScopeFrame, ScopedSlots};
pub use transform::{ApplyPattern, AsciiFilter, ChainKind, Flatten, Outcome, PathBuilder};

use crate::error::PipelineError;
use crate::script::Command;
use crate::types::{display_chain, DirChain};
use tracing::debug;

/// Default bound on duplicate indices tried per file
pub const DEFAULT_MAX_DUPLICATES: u32 = 1000;

/// Builder slots in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Flatten = 0,
    Pattern = 1,
    CharFilter = 2,
}

impl Slot {
    pub const COUNT: usize = 3;
}

/// Pipeline state captured at block entry
#[derive(Debug, Clone)]
pub struct PipelineFrame {
    slots: ScopeFrame,
    keep_duplicates: bool,
}

#[derive(Debug)]
pub struct PathPipeline {
    slots: ScopedSlots<Box<dyn PathBuilder>>,
    keep_duplicates: bool,
    chains: DirChainSet,
    max_duplicates: u32,
}

impl PathPipeline {
    pub fn new(max_duplicates: u32) -> Self {
        Self {
            slots: ScopedSlots::new(Slot::COUNT),
            keep_duplicates: false,
            chains: DirChainSet::new(),
            max_duplicates,
        }
    }

    pub fn frame(&self) -> PipelineFrame {
        PipelineFrame {
            slots: self.slots.frame(),
            keep_duplicates: self.keep_duplicates,
        }
    }

    pub fn restore(&mut self, frame: &PipelineFrame) {
        self.slots.restore(&frame.slots);
        self.keep_duplicates = frame.keep_duplicates;
    }

    /// Install `command` for a block whose path has `depth` segments.
    ///
    /// An enclosing `flatten` or `ascii` already covers the whole block, so
    /// nested repeats are no-ops.
    pub fn install(&mut self, command: Command, depth: usize) {
        debug!(command = command.keyword(), depth, "Installing command");
        match command {
            Command::Flatten => {
                if self.slots.top(Slot::Flatten as usize).is_none() {
                    self.slots
                        .push(Slot::Flatten as usize, Box::new(Flatten::new(depth)));
                }
            }
            Command::Pattern(pattern) => {
                self.slots
                    .push(Slot::Pattern as usize, Box::new(ApplyPattern::new(pattern)));
            }
            Command::Ascii => {
                if self.slots.top(Slot::CharFilter as usize).is_none() {
                    self.slots
                        .push(Slot::CharFilter as usize, Box::new(AsciiFilter::new(depth)));
                }
            }
            Command::KeepDuplicates => self.keep_duplicates = true,
        }
    }

    pub fn keep_duplicates(&self) -> bool {
        self.keep_duplicates
    }

    pub fn chains(&self) -> &DirChainSet {
        &self.chains
    }

    /// Run the active builders over `chain`; `None` means skip.
    fn transform(&mut self, chain: &[Vec<u8>], kind: ChainKind) -> Option<DirChain> {
        let mut current = chain.to_vec();
        for slot in 0..self.slots.slot_count() {
            let Some(builder) = self.slots.top_mut(slot) else {
                continue;
            };
            match builder.build(&current, kind) {
                Outcome::Skip => return None,
                Outcome::Unchanged => {}
                Outcome::Changed(next) => current = next,
            }
        }
        Some(current)
    }

    /// Destination for a directory entry, or `None` when it is skipped or was
    /// already emitted.
    ///
    /// Children are built from the script path, so a directory cannot be moved
    /// aside when a file already holds its chain; that is an error.
    pub fn build_directory(
        &mut self,
        chain: &[Vec<u8>],
    ) -> Result<Option<DirChain>, PipelineError> {
        let Some(built) = self.transform(chain, ChainKind::Directory) else {
            return Ok(None);
        };
        if built.is_empty() {
            return Ok(None);
        }
        match self.chains.kind(&built) {
            Some(ChainKind::Directory) => {
                debug!(path = %display_chain(chain), "Directory already emitted");
                Ok(None)
            }
            Some(ChainKind::File) => Err(PipelineError::DirectoryOverFile {
                path: display_chain(&built),
            }),
            None => {
                self.chains.record(&built, ChainKind::Directory);
                Ok(Some(built))
            }
        }
    }

    /// Destination for a file entry, made unique with a duplicate index when
    /// the built chain is already taken.
    pub fn build_file(&mut self, chain: &[Vec<u8>]) -> Result<Option<DirChain>, PipelineError> {
        let Some(built) = self.transform(chain, ChainKind::File) else {
            return Ok(None);
        };
        let Some((name, parent)) = built.split_last() else {
            return Ok(None);
        };
        for index in 0..self.max_duplicates {
            let candidate: DirChain = if index == 0 {
                built.clone()
            } else {
                let mut candidate = parent.to_vec();
                candidate.push(pattern::with_duplicate_suffix(name, index));
                candidate
            };
            if !self.chains.contains(&candidate) {
                self.chains.record(&candidate, ChainKind::File);
                return Ok(Some(candidate));
            }
        }
        Err(PipelineError::TooManyDuplicates {
            path: display_chain(&built),
            limit: self.max_duplicates,
        })
    }
}

impl Default for PathPipeline {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DUPLICATES)
    }
}
