//! dashsync CLI entry point.

use clap::Parser;
use dashsync::cli::Cli;
use dashsync::cli::commands;
use dashsync::config::Settings;
use dashsync::error::Error;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    let started = Instant::now();
    match run(&cli) {
        Ok(()) => {
            tracing::info!(elapsed = ?started.elapsed(), "Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            if cli.json {
                eprintln!("{}", e.to_structured_json());
            } else {
                eprintln!("Error: {e}");
                if let Some(hint) = e.hint().filter(|_| !cli.quiet) {
                    eprintln!("  Hint: {hint}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let settings = Settings::resolve(&cli.db, cli.export_dir.as_deref(), cli.by_uid)?;
    tracing::debug!(?settings, "Resolved settings");

    if cli.is_export() {
        commands::export::execute(&settings, cli.json, cli.quiet)
    } else {
        commands::import::execute(&settings, &cli.items, cli.json, cli.quiet)
    }
}
