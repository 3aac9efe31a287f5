//! Relink CLI Binary
//!
//! Command-line interface for snapshotting, deduplicating and relinking a tree.

use clap::Parser;
use relink::logging::init_logging;
use relink::tooling::cli::{Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();

    // Create CLI context
    let context = match CliContext::new(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(&context.config().logging) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    // Execute action
    match context.execute(cli.action) {
        Ok(report) => {
            print!("{}", report.output);
            for diagnostic in report.diagnostics.events() {
                eprintln!("{}", diagnostic);
            }
            if report.failed(context.config().force) {
                eprintln!(
                    "Error: {} diagnostic(s) recorded (rerun with --force to accept)",
                    report.diagnostics.len()
                );
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
