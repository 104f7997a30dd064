//! Sync types for dashboard export/import.
//!
//! Import items as given on the command line, and the reports returned by
//! the exporter and importer. Reports are `Serialize` so the CLI can print
//! them verbatim in `--json` mode.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::sync::tags::TagDiff;

/// How input documents are paired with database rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Per item, by title, with an optional rename override.
    #[default]
    Title,
    /// In bulk, by the dashboard's stable `uid`.
    Uid,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Uid => write!(f, "uid"),
        }
    }
}

/// Rename override of a title-matching item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rename {
    /// Title the dashboard currently has in the database.
    pub old_title: String,
    /// Slug to store alongside the new title.
    pub new_slug: String,
}

/// One import argument: `file.json` or `file.json;old title;new slug`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportItem {
    pub path: PathBuf,
    pub rename: Option<Rename>,
}

impl ImportItem {
    /// Parse a title-matching item. Only one or three `;`-separated parts are
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidItem`] for any other arity or an empty path.
    pub fn parse(arg: &str) -> Result<Self> {
        let parts: Vec<&str> = arg.split(';').collect();
        let item = match parts.as_slice() {
            [path] => Self {
                path: PathBuf::from(path),
                rename: None,
            },
            [path, old_title, new_slug] => Self {
                path: PathBuf::from(path),
                rename: Some(Rename {
                    old_title: (*old_title).to_string(),
                    new_slug: (*new_slug).to_string(),
                }),
            },
            _ => return Err(Error::InvalidItem(arg.to_string())),
        };
        if item.path.as_os_str().is_empty() {
            return Err(Error::InvalidItem(arg.to_string()));
        }
        Ok(item)
    }

    /// A bare path item. Identifier matching takes the whole argument as the
    /// path, `;` included.
    #[must_use]
    pub fn bare(arg: &str) -> Self {
        Self {
            path: PathBuf::from(arg),
            rename: None,
        }
    }
}

/// What happened to one input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Content, title, slug or tags were written.
    Updated,
    /// Nothing differed.
    Unchanged,
    /// Matched row belongs to a different uid; left alone.
    Skipped,
}

/// Per-document import report.
#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    pub path: PathBuf,
    pub uid: String,
    pub status: ItemStatus,
    /// Dashboard id the document was matched to.
    pub id: i64,
    pub old_title: String,
    pub new_title: String,
    pub old_slug: String,
    pub new_slug: String,
    /// Canonical JSON differed from the stored one.
    pub content_changed: bool,
    /// Stored and new canonical JSON sizes in bytes.
    pub old_bytes: usize,
    pub new_bytes: usize,
    /// Tag statements issued, if the tag sets differed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagDiff>,
    /// Pre-update snapshot written for this document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidecar: Option<PathBuf>,
    /// Why the document was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Import run report.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub mode: MatchMode,
    /// Dashboards in the database.
    pub database_records: usize,
    /// Input documents given.
    pub input_documents: usize,
    /// Documents that changed something.
    pub imported: usize,
    /// Documents skipped over a uid mismatch.
    pub skipped: usize,
    /// Full database backup written by this run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
    pub items: Vec<ItemOutcome>,
}

impl ImportSummary {
    #[must_use]
    pub fn new(mode: MatchMode, database_records: usize, input_documents: usize) -> Self {
        Self {
            mode,
            database_records,
            input_documents,
            imported: 0,
            skipped: 0,
            backup: None,
            items: Vec::new(),
        }
    }

    /// Record an item and bump the matching counter.
    pub fn push(&mut self, outcome: ItemOutcome) {
        match outcome.status {
            ItemStatus::Updated => self.imported += 1,
            ItemStatus::Skipped => self.skipped += 1,
            ItemStatus::Unchanged => {}
        }
        self.items.push(outcome);
    }

    /// Count of documents that needed no change.
    #[must_use]
    pub fn unchanged(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.status == ItemStatus::Unchanged)
            .count()
    }
}

/// One exported dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedFile {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub path: PathBuf,
}

/// Export run report.
#[derive(Debug, Clone, Serialize)]
pub struct ExportStats {
    pub output_dir: PathBuf,
    pub files: Vec<ExportedFile>,
}

impl ExportStats {
    /// Number of dashboards written.
    #[must_use]
    pub fn total(&self) -> usize {
        self.files.len()
    }

    /// Returns true if nothing was exported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
