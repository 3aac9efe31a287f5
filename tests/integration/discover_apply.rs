use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use relink::config::RelinkConfig;
use relink::diagnostics::DiagnosticKind;
use relink::escape::shell_escape;
use relink::tooling::cli::{Action, CliContext, OutputFormat};
use tempfile::TempDir;

/// a.txt and b/c.txt share content, e.txt is a hard link to a.txt.
fn sample_repo(root: &Path) -> PathBuf {
    let repo = root.join("repo");
    fs::create_dir_all(repo.join("b")).unwrap();
    fs::write(repo.join("a.txt"), "same").unwrap();
    fs::write(repo.join("b/c.txt"), "same").unwrap();
    fs::write(repo.join("b/d.txt"), "other").unwrap();
    fs::hard_link(repo.join("a.txt"), repo.join("e.txt")).unwrap();
    dunce::canonicalize(&repo).unwrap()
}

fn ino(path: &Path) -> u64 {
    fs::metadata(path).unwrap().ino()
}

fn shell(path: &Path) -> String {
    shell_escape(path.as_os_str().as_bytes(), false).unwrap()
}

fn context(root: &Path, repo: &Path, format: OutputFormat) -> CliContext {
    let config = RelinkConfig {
        rename_repo: repo.to_path_buf(),
        rename_file: PathBuf::from("plan"),
        prefix: "/out".to_string(),
        ..RelinkConfig::default()
    };
    CliContext::with_config(config, root.to_path_buf(), format)
}

#[test]
fn load_writes_script_with_alternatives() {
    let temp = TempDir::new().unwrap();
    let repo = sample_repo(temp.path());
    let cli = context(temp.path(), &repo, OutputFormat::Text);

    let report = cli.execute(Action::Load).unwrap();
    assert!(report.diagnostics.is_empty());
    assert!(report.output.contains("Duplicate groups: 1"));

    let (a, c, d) = (
        ino(&repo.join("a.txt")),
        ino(&repo.join("b/c.txt")),
        ino(&repo.join("b/d.txt")),
    );
    let script = fs::read_to_string(temp.path().join("plan")).unwrap();
    assert_eq!(
        script,
        format!(
            "a.txt #{a}|{c}\nb {{\n    c.txt #{c}|{a}\n    d.txt #{d}\n}}\ne.txt #{a}|{c}\n"
        )
    );
}

#[test]
fn load_json_summary() {
    let temp = TempDir::new().unwrap();
    let repo = sample_repo(temp.path());
    let cli = context(temp.path(), &repo, OutputFormat::Json);

    let report = cli.execute(Action::Load).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&report.output).unwrap();
    assert_eq!(parsed["files"], 4);
    assert_eq!(parsed["directories"], 1);
    assert_eq!(parsed["duplicate_groups"], 1);
    assert_eq!(parsed["redundant_files"], 2);
    assert_eq!(parsed["reclaimable_bytes"], 4);
}

#[test]
fn apply_unchanged_script_reproduces_layout() {
    let temp = TempDir::new().unwrap();
    let repo = sample_repo(temp.path());
    let cli = context(temp.path(), &repo, OutputFormat::Text);
    cli.execute(Action::Load).unwrap();

    let report = cli.execute(Action::Apply).unwrap();
    assert!(report.diagnostics.is_empty());
    let a = shell(&repo.join("a.txt"));
    let c = shell(&repo.join("b/c.txt"));
    let d = shell(&repo.join("b/d.txt"));
    assert_eq!(
        report.output,
        format!(
            "mkdir -p /out\n\
             ln {a} /out/a.txt\n\
             mkdir -p /out/b\n\
             # ln {c} /out/b/c.txt\n\
             ln {d} /out/b/d.txt\n\
             # ln {a} /out/e.txt\n"
        )
    );
}

#[test]
fn apply_edited_script_with_commands() {
    let temp = TempDir::new().unwrap();
    let repo = sample_repo(temp.path());
    let (a, c, d) = (
        ino(&repo.join("a.txt")),
        ino(&repo.join("b/c.txt")),
        ino(&repo.join("b/d.txt")),
    );
    fs::write(
        temp.path().join("plan"),
        format!(
            "$keepdups\nall {{\n    $flatten\n    $pattern %un_%2N%.%e\n    x {{\n        a.txt #{a}|{c}\n        c.txt #{c}|{a}\n    }}\n    d.txt #{d}\n}}\n"
        ),
    )
    .unwrap();
    let cli = context(temp.path(), &repo, OutputFormat::Text);

    let report = cli.execute(Action::Apply).unwrap();
    let lines: Vec<&str> = report.output.lines().collect();
    assert_eq!(lines[0], "mkdir -p /out");
    assert_eq!(lines[1], "mkdir -p /out/all");
    assert!(lines[2].ends_with(" /out/all/A_01.txt"));
    assert!(lines[3].ends_with(" /out/all/C_02.txt"));
    assert!(!lines[3].starts_with('#'));
    assert!(lines[4].ends_with(" /out/all/D_03.txt"));
    assert_eq!(lines.len(), 5);
}

#[test]
fn apply_reports_missing_sources() {
    let temp = TempDir::new().unwrap();
    let repo = sample_repo(temp.path());
    let a = ino(&repo.join("a.txt"));
    fs::write(
        temp.path().join("plan"),
        format!("a.txt #{a}\nghost.txt #999999999\n"),
    )
    .unwrap();
    let cli = context(temp.path(), &repo, OutputFormat::Text);

    let report = cli.execute(Action::Apply).unwrap();
    assert_eq!(report.diagnostics.count(DiagnosticKind::UnknownSource), 1);
    assert!(report.failed(false));
    assert!(!report.failed(true));
    assert!(!report.output.contains("ghost"));
}

#[test]
fn apply_grammar_error_is_fatal() {
    let temp = TempDir::new().unwrap();
    let repo = sample_repo(temp.path());
    fs::write(temp.path().join("plan"), "a.txt #1\nb {\n").unwrap();
    let cli = context(temp.path(), &repo, OutputFormat::Text);

    let err = cli.execute(Action::Apply).unwrap_err();
    assert!(err.to_string().contains("directory block is not closed"));
}
