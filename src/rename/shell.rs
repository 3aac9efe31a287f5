//! Shell script output

use crate::error::EscapeError;
use crate::escape::{shell_escape, HARDENED_PREAMBLE};
use crate::rename::RenameRecord;
use crate::types::join_chain;
use std::fmt::Write;
use std::os::unix::ffi::OsStrExt;

/// Renders rename records as `mkdir -p` / `ln` lines.
///
/// The prefix is written verbatim in front of every destination.
#[derive(Debug, Clone, Default)]
pub struct ShellRenderer {
    prefix: String,
    hardened: bool,
}

impl ShellRenderer {
    pub fn new(prefix: impl Into<String>, hardened: bool) -> Self {
        Self {
            prefix: prefix.into(),
            hardened,
        }
    }

    /// Without a prefix the destination is relative; a leading `-` is anchored
    /// with `./` so `ln` and `mkdir` do not read it as an option.
    fn destination(&self, record: &RenameRecord) -> Result<String, EscapeError> {
        let mut path = join_chain(&record.destination);
        if self.prefix.is_empty() {
            if path.first() == Some(&b'-') {
                path = [b"./".as_slice(), &path].concat();
            }
            return shell_escape(&path, self.hardened);
        }
        let escaped = shell_escape(&path, self.hardened)?;
        Ok(format!("{}/{}", self.prefix.trim_end_matches('/'), escaped))
    }

    pub fn render_record(&self, record: &RenameRecord) -> Result<String, EscapeError> {
        let destination = self.destination(record)?;
        let line = match &record.source {
            None => format!("mkdir -p {}", destination),
            Some(source) => format!(
                "ln {} {}",
                shell_escape(source.as_os_str().as_bytes(), self.hardened)?,
                destination
            ),
        };
        if record.is_commented() {
            Ok(format!("# {}", line))
        } else {
            Ok(line)
        }
    }

    /// Render the whole script. Any record that cannot be escaped fails the
    /// whole render.
    pub fn render(&self, records: &[RenameRecord]) -> Result<String, EscapeError> {
        let mut out = String::new();
        if self.hardened {
            let _ = writeln!(out, "{}", HARDENED_PREAMBLE);
        }
        if !self.prefix.is_empty() {
            let _ = writeln!(out, "mkdir -p {}", self.prefix);
        }
        for record in records {
            let _ = writeln!(out, "{}", self.render_record(record)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rename::RecordFlags;
    use std::path::PathBuf;

    fn dir(path: &str) -> RenameRecord {
        RenameRecord {
            source: None,
            destination: path.split('/').map(|s| s.as_bytes().to_vec()).collect(),
            flags: RecordFlags::default(),
        }
    }

    fn link(source: &str, path: &str, duplicate: bool, keep: bool) -> RenameRecord {
        RenameRecord {
            source: Some(PathBuf::from(source)),
            flags: RecordFlags { duplicate, keep },
            ..dir(path)
        }
    }

    #[test]
    fn test_render_with_prefix() {
        let renderer = ShellRenderer::new("/out", false);
        let script = renderer
            .render(&[
                dir("photos"),
                link("/repo/a b.jpg", "photos/a.jpg", false, false),
                link("/repo/c.jpg", "photos/c.jpg", true, false),
                link("/repo/d.jpg", "photos/d.jpg", true, true),
            ])
            .unwrap();
        assert_eq!(
            script,
            "mkdir -p /out\n\
             mkdir -p /out/photos\n\
             ln \"/repo/a b.jpg\" /out/photos/a.jpg\n\
             # ln /repo/c.jpg /out/photos/c.jpg\n\
             ln /repo/d.jpg /out/photos/d.jpg\n"
        );
    }

    #[test]
    fn test_render_without_prefix() {
        let renderer = ShellRenderer::default();
        assert_eq!(
            renderer.render(&[dir("a b")]).unwrap(),
            "mkdir -p \"a b\"\n"
        );
    }

    #[test]
    fn test_leading_dash_is_not_an_option() {
        let renderer = ShellRenderer::default();
        assert_eq!(
            renderer
                .render(&[dir("-x"), link("/repo/a.jpg", "-f", false, false)])
                .unwrap(),
            "mkdir -p ./-x\nln /repo/a.jpg ./-f\n"
        );
        assert_eq!(
            renderer.render_record(&dir("-a b")).unwrap(),
            "mkdir -p \"./-a b\""
        );
        assert_eq!(
            ShellRenderer::new("/out", false)
                .render_record(&link("/repo/a.jpg", "-f", false, false))
                .unwrap(),
            "ln /repo/a.jpg /out/-f"
        );
    }

    #[test]
    fn test_control_bytes_need_hardening() {
        let record = dir("bad\nname");
        assert!(ShellRenderer::new("", false).render_record(&record).is_err());
        let hardened = ShellRenderer::new("", true).render_record(&record).unwrap();
        assert!(hardened.starts_with("mkdir -p \"$(printf '"));
    }

    #[test]
    fn test_hardened_script_starts_with_preamble() {
        let script = ShellRenderer::new("", true)
            .render(&[link("/repo/a\n", "a", false, false)])
            .unwrap();
        let mut lines = script.lines();
        assert_eq!(lines.next(), Some(HARDENED_PREAMBLE));
        assert_eq!(
            lines.next(),
            Some("ln \"$(printf '\\057\\162\\145\\160\\157\\057\\141')${relink_nl}\" a")
        );
    }
}
