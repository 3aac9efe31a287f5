use clap::{CommandFactory, Parser};
use relink::tooling::cli::{Action, Cli, OutputFormat};

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["relink", "load"],
        vec!["relink", "apply"],
        vec!["relink", "load", "--format", "json"],
        vec!["relink", "load", "--rename-repo", "photos", "--rename-file", "plan"],
        vec!["relink", "apply", "--force", "--prefix", "/mnt/out"],
        vec!["relink", "apply", "--hardened", "--config", "relink.toml"],
        vec![
            "relink",
            "apply",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "--log-output",
            "file",
            "--log-file",
            "/tmp/relink.log",
        ],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_invalid_invocations() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["relink"],
        vec!["relink", "move"],
        vec!["relink", "load", "--format", "xml"],
        vec!["relink", "apply", "--prefix"],
        vec!["relink", "load", "apply"],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_err(), "expected parse failure for args: {args:?}");
    }
}

#[test]
fn parse_defaults() {
    let cli = Cli::try_parse_from(["relink", "apply"]).unwrap();
    assert_eq!(cli.action, Action::Apply);
    assert_eq!(cli.format, OutputFormat::Text);
    assert!(!cli.force);
    assert!(!cli.hardened);
    assert_eq!(cli.rename_file, None);
    assert_eq!(cli.prefix, None);
}

#[test]
fn help_mentions_every_flag() {
    let mut command = Cli::command();
    let mut output = Vec::new();
    command.write_long_help(&mut output).unwrap();
    let output = String::from_utf8(output).unwrap();

    for token in [
        "load",
        "apply",
        "--rename-file",
        "--rename-repo",
        "--force",
        "--prefix",
        "--hardened",
        "--format",
    ] {
        assert!(output.contains(token), "help is missing {token}");
    }
}
