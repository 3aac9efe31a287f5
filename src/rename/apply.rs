//! Replaying a rename script against a snapshot

use crate::diagnostics::Diagnostics;
use crate::error::ScriptError;
use crate::pipeline::{PathPipeline, PipelineFrame};
use crate::rename::groups::InodeGroups;
use crate::rename::{RecordFlags, RenameRecord};
use crate::script::{Command, ScriptHandler};
use crate::tree::{InodeMap, Snapshot};
use crate::types::{display_chain, Inode, NodeId};
use tracing::debug;

/// [`ScriptHandler`] that turns script events into rename records.
pub struct RenameApplier<'a> {
    snapshot: &'a Snapshot,
    inodes: InodeMap,
    pipeline: PathPipeline,
    frames: Vec<PipelineFrame>,
    groups: InodeGroups,
    records: Vec<RenameRecord>,
    diagnostics: Diagnostics,
}

impl<'a> RenameApplier<'a> {
    pub fn new(snapshot: &'a Snapshot, max_duplicates: u32) -> Self {
        Self {
            snapshot,
            inodes: snapshot.inode_map(),
            pipeline: PathPipeline::new(max_duplicates),
            frames: Vec::new(),
            groups: InodeGroups::new(),
            records: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn into_parts(self) -> (Vec<RenameRecord>, Diagnostics) {
        (self.records, self.diagnostics)
    }

    /// First candidate present in the snapshot. Candidates skipped on the way
    /// are reported as missing; an entry without any match is reported once.
    fn resolve(&mut self, path: &str, inodes: &[Inode], offset: usize) -> Option<NodeId> {
        let position = inodes.iter().position(|i| self.inodes.contains_key(i));
        let Some(position) = position else {
            self.diagnostics.unknown_source(path, offset);
            return None;
        };
        for &missing in &inodes[..position] {
            self.diagnostics.missing_inode(path, missing, offset);
        }
        self.inodes.get(&inodes[position]).copied()
    }
}

impl ScriptHandler for RenameApplier<'_> {
    fn enter_block(&mut self, _path: &[Vec<u8>]) {
        self.frames.push(self.pipeline.frame());
    }

    fn leave_block(&mut self) {
        if let Some(frame) = self.frames.pop() {
            self.pipeline.restore(&frame);
        }
    }

    fn command(
        &mut self,
        path: &[Vec<u8>],
        command: Command,
        _offset: usize,
    ) -> Result<(), ScriptError> {
        self.pipeline.install(command, path.len());
        Ok(())
    }

    fn directory(&mut self, path: &[Vec<u8>], _offset: usize) -> Result<(), ScriptError> {
        if let Some(destination) = self.pipeline.build_directory(path)? {
            self.records.push(RenameRecord {
                source: None,
                destination,
                flags: RecordFlags::default(),
            });
        }
        Ok(())
    }

    fn file(
        &mut self,
        path: &[Vec<u8>],
        inodes: &[Inode],
        offset: usize,
    ) -> Result<(), ScriptError> {
        let display = display_chain(path);
        let Some(node) = self.resolve(&display, inodes, offset) else {
            return Ok(());
        };
        let duplicate = match self.groups.join(inodes) {
            Some(root) => self.groups.mark_emitted(root),
            None => false,
        };
        let Some(destination) = self.pipeline.build_file(path)? else {
            return Ok(());
        };
        let source = self.snapshot.source_path(node);
        debug!(
            destination = %display_chain(&destination),
            source = %source.display(),
            duplicate,
            "Resolved file entry"
        );
        self.records.push(RenameRecord {
            source: Some(source),
            destination,
            flags: RecordFlags {
                duplicate,
                keep: duplicate && self.pipeline.keep_duplicates(),
            },
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::DiagnosticKind;
    use crate::error::{GrammarErrorKind, ScriptError};
    use crate::rename::{apply_script, RenameOutput};
    use crate::tree::{MemoryProvider, Snapshot};
    use crate::types::display_chain;
    use std::path::Path;

    fn snapshot(provider: &MemoryProvider) -> Snapshot {
        let mut snapshot = Snapshot::build(provider, Path::new("/repo")).unwrap();
        snapshot
            .stat_pass(provider, &mut crate::diagnostics::Diagnostics::new())
            .unwrap();
        snapshot
    }

    fn sample() -> Snapshot {
        snapshot(
            &MemoryProvider::new("/repo")
                .with_file_inode("a.jpg", b"one", 10)
                .with_file_inode("b.jpg", b"one", 11)
                .with_file_inode("c.txt", b"two", 12),
        )
    }

    fn destinations(output: &RenameOutput) -> Vec<String> {
        output
            .records
            .iter()
            .map(|r| display_chain(&r.destination))
            .collect()
    }

    #[test]
    fn test_missing_source_is_one_diagnostic() {
        let snapshot = sample();
        let output = apply_script(b"gone.txt #99\n", &snapshot, 1000).unwrap();
        assert!(output.records.is_empty());
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(
            output.diagnostics.count(DiagnosticKind::UnknownSource),
            1
        );
    }

    #[test]
    fn test_fallback_candidate_is_used() {
        let snapshot = sample();
        let output = apply_script(b"x.jpg #99|11\n", &snapshot, 1000).unwrap();
        assert_eq!(output.records.len(), 1);
        assert_eq!(
            output.records[0].source.as_deref(),
            Some(Path::new("/repo/b.jpg"))
        );
        assert_eq!(output.diagnostics.count(DiagnosticKind::MissingInode), 1);
        assert_eq!(output.diagnostics.count(DiagnosticKind::UnknownSource), 0);
    }

    #[test]
    fn test_duplicates_are_flagged() {
        let snapshot = sample();
        let script = b"a.jpg #10|11\nb.jpg #11|10\nc.txt #12\n";
        let output = apply_script(script, &snapshot, 1000).unwrap();
        let flags: Vec<(bool, bool)> = output
            .records
            .iter()
            .map(|r| (r.flags.duplicate, r.flags.keep))
            .collect();
        assert_eq!(flags, vec![(false, false), (true, false), (false, false)]);

        let kept = apply_script(
            b"$keepdups\na.jpg #10|11\nb.jpg #11|10\n",
            &snapshot,
            1000,
        )
        .unwrap();
        assert!(kept.records[1].flags.duplicate);
        assert!(kept.records[1].flags.keep);
    }

    #[test]
    fn test_directories_and_nested_scopes() {
        let snapshot = sample();
        let script = b"out {\n    $pattern img_%N.%e\n    a.jpg #10\n    b.jpg #11\n}\nc.txt #12\n";
        let output = apply_script(script, &snapshot, 1000).unwrap();
        assert_eq!(
            destinations(&output),
            vec!["out", "out/img_1.jpg", "out/img_2.jpg", "c.txt"]
        );
        assert_eq!(output.records[0].source, None);
    }

    #[test]
    fn test_sibling_unaffected_after_failed_block() {
        let snapshot = sample();
        let mut applier = super::RenameApplier::new(&snapshot, 1000);
        let err = crate::script::parse_script(
            b"bad {\n    $pattern X.%e\n    a.jpg #10\n    $ascii\n}\n",
            &mut applier,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Grammar(ref e) if e.kind == GrammarErrorKind::CommandAfterEntry
        ));
        crate::script::parse_script(b"good {\n    c.txt #12\n}\n", &mut applier).unwrap();
        let (records, _) = applier.into_parts();
        let names: Vec<String> = records.iter().map(|r| display_chain(&r.destination)).collect();
        assert_eq!(names, vec!["bad", "bad/X.jpg", "good", "good/c.txt"]);
    }

    #[test]
    fn test_flatten_collapses_subdirectories() {
        let snapshot = sample();
        let script = b"top {\n    $flatten\n    sub {\n        deeper {\n            a.jpg #10\n        }\n    }\n    c.txt #12\n}\n";
        let output = apply_script(script, &snapshot, 1000).unwrap();
        assert_eq!(destinations(&output), vec!["top", "top/a.jpg", "top/c.txt"]);
    }

    #[test]
    fn test_directory_after_file_of_same_name_aborts() {
        let snapshot = sample();
        let script = b"a #10\na {\n    b #11\n}\n";
        let err = apply_script(script, &snapshot, 1000).unwrap_err();
        assert_eq!(
            err,
            ScriptError::Pipeline(crate::error::PipelineError::DirectoryOverFile {
                path: "a".to_string()
            })
        );
    }

    #[test]
    fn test_too_many_duplicates_aborts() {
        let snapshot = sample();
        let script = b"$pattern same\na #10\nb #11\nc #12\n";
        let err = apply_script(script, &snapshot, 2).unwrap_err();
        assert!(matches!(err, ScriptError::Pipeline(_)));
    }
}
