//! CLI definitions using clap.

use clap::Parser;
use std::path::PathBuf;

pub mod commands;

const AFTER_HELP: &str = "\
Without ITEMS every dashboard is exported to <EXPORT_DIR>/<slug>.json.

With ITEMS the JSON files are imported back into the database. In title mode
(the default) each item is either

  file.json                       match the dashboard titled like the file
  'file.json;Old title;new-slug'  match by the old title, store the new slug

With --by-uid (or DASHSYNC_UID_MODE=1) each item is a bare path and
dashboards are matched by their uid.

A full copy of the database is written to <DB>.<unix-nanoseconds> before the
first change, and each updated dashboard's previous JSON is kept next to its
input as <file>.was.";

/// Reconcile Grafana dashboards between a SQLite database and JSON files
#[derive(Parser, Debug)]
#[command(name = "dashsync", author, version, about, long_about = None, after_help = AFTER_HELP)]
pub struct Cli {
    /// Grafana SQLite database file
    pub db: PathBuf,

    /// JSON files to import (export when omitted)
    pub items: Vec<String>,

    /// Match dashboards by uid instead of title
    #[arg(long)]
    pub by_uid: bool,

    /// Directory exported dashboards are written to [default: sqlite]
    #[arg(long, env = "DASHSYNC_EXPORT_DIR")]
    pub export_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Export runs when no import items were given.
    #[must_use]
    pub fn is_export(&self) -> bool {
        self.items.is_empty()
    }
}
