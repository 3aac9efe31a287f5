//! Format discover-mode summaries as text or JSON.

use crate::index::{ContentIndex, IndexSummary};
use crate::tree::Snapshot;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde::Serialize;

/// Largest duplicate groups listed in a summary
pub const MAX_GROUP_ROWS: usize = 10;

/// One duplicate group in a summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRow {
    pub short_hash: String,
    pub copies: usize,
    pub reclaimable_bytes: u64,
    pub paths: Vec<String>,
}

/// Result of a `load` run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rename_file: String,
    pub directories: usize,
    #[serde(flatten)]
    pub summary: IndexSummary,
    pub groups: Vec<GroupRow>,
}

impl LoadReport {
    pub fn new(rename_file: String, snapshot: &Snapshot, index: &ContentIndex) -> Self {
        let directories = snapshot
            .preorder()
            .into_iter()
            .filter(|&id| id != Snapshot::ROOT && snapshot.node(id).is_dir())
            .count();

        let mut groups: Vec<GroupRow> = index
            .duplicate_groups()
            .map(|group| {
                let paths: Vec<String> = group
                    .members
                    .iter()
                    .map(|&m| snapshot.display_path(index.record(m).node))
                    .collect();
                let reclaimable_bytes = index.reclaimable_bytes(snapshot, group);
                GroupRow {
                    short_hash: group.short_hash.clone(),
                    copies: group.members.len(),
                    reclaimable_bytes,
                    paths,
                }
            })
            .collect();
        groups.sort_by(|a, b| {
            b.reclaimable_bytes
                .cmp(&a.reclaimable_bytes)
                .then_with(|| b.copies.cmp(&a.copies))
        });
        groups.truncate(MAX_GROUP_ROWS);

        Self {
            rename_file,
            directories,
            summary: index.summary(snapshot),
            groups,
        }
    }
}

/// Format a load report as human-readable text.
pub fn format_load_text(report: &LoadReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Wrote {}\n\n", report.rename_file));
    out.push_str(&format!("  Files: {}\n", report.summary.files));
    out.push_str(&format!("  Directories: {}\n", report.directories));
    out.push_str(&format!(
        "  Duplicate groups: {}\n",
        report.summary.duplicate_groups
    ));
    out.push_str(&format!(
        "  Redundant copies: {}\n",
        report.summary.redundant_files
    ));
    out.push_str(&format!(
        "  Reclaimable: {}\n",
        format_bytes(report.summary.reclaimable_bytes)
    ));
    if report.groups.is_empty() {
        return out;
    }

    out.push_str("\n  Largest duplicate groups\n\n");
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Hash", "Copies", "Reclaimable", "Paths"]);
    for row in &report.groups {
        table.add_row(vec![
            row.short_hash.clone(),
            row.copies.to_string(),
            format_bytes(row.reclaimable_bytes),
            row.paths.join("\n"),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

/// Format a load report as pretty JSON.
pub fn format_load_json(report: &LoadReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{:.1} {}", value, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> LoadReport {
        LoadReport {
            rename_file: ".rename".to_string(),
            directories: 2,
            summary: IndexSummary {
                files: 4,
                duplicate_groups: 1,
                redundant_files: 2,
                reclaimable_bytes: 2048,
            },
            groups: vec![GroupRow {
                short_hash: "ABCDEFGHIJKLMNO".to_string(),
                copies: 3,
                reclaimable_bytes: 2048,
                paths: vec!["a".to_string(), "b/a".to_string(), "c".to_string()],
            }],
        }
    }

    #[test]
    fn test_text_summary() {
        let text = format_load_text(&report());
        assert!(text.starts_with("Wrote .rename\n"));
        assert!(text.contains("  Files: 4\n"));
        assert!(text.contains("  Reclaimable: 2.0 KiB\n"));
        assert!(text.contains("ABCDEFGHIJKLMNO"));
    }

    #[test]
    fn test_json_summary_is_flat() {
        let value: serde_json::Value = serde_json::from_str(&format_load_json(&report())).unwrap();
        assert_eq!(value["files"], 4);
        assert_eq!(value["redundant_files"], 2);
        assert_eq!(value["groups"][0]["copies"], 3);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(12), "12 B");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MiB");
    }
}
