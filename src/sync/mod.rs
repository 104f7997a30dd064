//! Dashboard sync between SQLite and JSON files.
//!
//! - **Export**: every `dashboard` row -> `<dir>/<slug>.json`
//! - **Import**: JSON files -> matching rows, by uid or by title
//! - **Codec**: field extraction and the canonical JSON form
//! - **Tags**: `dashboard_tag` reconciliation
//! - **Backup**: once-per-run database copy and `.was` sidecars
//!
//! # Example
//!
//! ```ignore
//! use dashsync::storage::SqliteStorage;
//! use dashsync::sync::{BackupManager, Importer, MatchMode};
//!
//! let backup = BackupManager::capture(&db_path)?;
//! let storage = SqliteStorage::open(&db_path)?;
//! let mut importer = Importer::new(&storage, backup);
//! let summary = importer.import(MatchMode::Uid, &args)?;
//! ```

mod backup;
mod codec;
mod export;
mod file;
mod import;
mod slug;
mod tags;
mod types;

pub use backup::{BackupManager, SIDECAR_SUFFIX, sidecar_path, write_sidecar};
pub use codec::{ParsedDashboard, StoredDashboard, canonicalize, parse_document, parse_stored};
pub use export::{Exporter, export_path};
pub use file::{atomic_write, read_file, with_suffix};
pub use import::Importer;
pub use slug::slugify;
pub use tags::{TagDiff, apply_tag_diff, plan_tags, reconcile_tags};
pub use types::{
    ExportStats, ExportedFile, ImportItem, ImportSummary, ItemOutcome, ItemStatus, MatchMode,
    Rename,
};
