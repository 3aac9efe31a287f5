//! Rendering a snapshot as a rename script

use crate::escape::escape_quoted;
use crate::index::ContentIndex;
use crate::tree::{Snapshot, Visitor};
use crate::types::NodeId;
use std::convert::Infallible;
use std::fmt::Write;

const INDENT: &str = "    ";

struct ScriptWriter<'a> {
    index: &'a ContentIndex,
    out: String,
    depth: usize,
}

impl ScriptWriter<'_> {
    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }
}

impl Visitor for ScriptWriter<'_> {
    type Error = Infallible;

    fn dir_open(&mut self, snapshot: &Snapshot, id: NodeId) -> Result<(), Infallible> {
        if id == Snapshot::ROOT {
            return Ok(());
        }
        self.indent();
        self.out.push_str(&escape_quoted(&snapshot.node(id).name));
        self.out.push_str(" {\n");
        self.depth += 1;
        Ok(())
    }

    fn dir_close(&mut self, _snapshot: &Snapshot, id: NodeId) -> Result<(), Infallible> {
        if id == Snapshot::ROOT {
            return Ok(());
        }
        self.depth -= 1;
        self.indent();
        self.out.push_str("}\n");
        Ok(())
    }

    fn file(&mut self, snapshot: &Snapshot, id: NodeId) -> Result<(), Infallible> {
        let inodes = self.index.alternatives(snapshot, id);
        if inodes.is_empty() {
            return Ok(());
        }
        self.indent();
        self.out.push_str(&escape_quoted(&snapshot.node(id).name));
        self.out.push_str(" #");
        for (i, inode) in inodes.iter().enumerate() {
            if i > 0 {
                self.out.push('|');
            }
            let _ = write!(self.out, "{}", inode);
        }
        self.out.push('\n');
        Ok(())
    }
}

/// Render `snapshot` as a rename script that reproduces its current layout.
///
/// Each file lists its own inode first, followed by the inodes of the other
/// files in its content group.
pub fn render_script(snapshot: &Snapshot, index: &ContentIndex) -> String {
    let mut writer = ScriptWriter {
        index,
        out: String::new(),
        depth: 0,
    };
    match snapshot.traverse(&mut writer) {
        Ok(()) => writer.out,
        Err(never) => match never {},
    }
}
