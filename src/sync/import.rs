//! Dashboard import.
//!
//! Merges edited dashboard JSON files back into the database. Two matching
//! strategies exist and a run uses exactly one:
//!
//! - **uid matching** ([`Importer::import_by_uid`]) loads every stored
//!   dashboard, keys it by `uid`, validates all inputs up front, then updates
//!   only what differs. Unknown or duplicated uids abort the run before any
//!   write.
//! - **title matching** ([`Importer::import_by_title`]) handles one item at
//!   a time, finds the row by title (or by the rename override's old title)
//!   and overwrites it. A uid mismatch there skips the item instead of
//!   failing, so stale title references don't block the rest of the batch.
//!
//! Either way the database file is backed up once, right before the first
//! write of the run, and each rewritten dashboard leaves its previous JSON in
//! a `<input>.was` sidecar. Nothing is wrapped in a transaction.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::DashboardRecord;
use crate::storage::SqliteStorage;
use crate::sync::backup::{BackupManager, write_sidecar};
use crate::sync::codec::{ParsedDashboard, StoredDashboard, parse_document, parse_stored};
use crate::sync::file::read_file;
use crate::sync::slug::slugify;
use crate::sync::tags::{apply_tag_diff, plan_tags, reconcile_tags};
use crate::sync::types::{ImportItem, ImportSummary, ItemOutcome, ItemStatus, MatchMode};

/// A database row with its parsed JSON.
struct StoredEntry {
    record: DashboardRecord,
    stored: StoredDashboard,
}

/// A validated uid-matching input.
struct PendingImport<'m> {
    path: &'m Path,
    parsed: ParsedDashboard,
    slug: String,
    target: &'m StoredEntry,
}

/// Importer for dashboard JSON files.
///
/// Owns the run's backup state; create one per run.
pub struct Importer<'a> {
    storage: &'a SqliteStorage,
    backup: BackupManager,
}

impl<'a> Importer<'a> {
    /// Create a new importer.
    ///
    /// `backup` must have captured the database before `storage` was used
    /// for writing.
    #[must_use]
    pub fn new(storage: &'a SqliteStorage, backup: BackupManager) -> Self {
        Self { storage, backup }
    }

    /// Database backup written so far in this run.
    #[must_use]
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup.backup_path()
    }

    /// Run the strategy selected by `mode`.
    ///
    /// Items are parsed for title matching; uid matching takes each argument
    /// as a bare path.
    ///
    /// # Errors
    ///
    /// See [`Importer::import_by_uid`] and [`Importer::import_by_title`].
    pub fn import(&mut self, mode: MatchMode, args: &[String]) -> Result<ImportSummary> {
        match mode {
            MatchMode::Uid => {
                let paths: Vec<PathBuf> = args.iter().map(|a| ImportItem::bare(a).path).collect();
                self.import_by_uid(&paths)
            }
            MatchMode::Title => {
                let items = args
                    .iter()
                    .map(|a| ImportItem::parse(a))
                    .collect::<Result<Vec<_>>>()?;
                self.import_by_title(&items)
            }
        }
    }

    // ============
    // uid matching
    // ============

    /// Import by matching each document's `uid` to a stored dashboard.
    ///
    /// For every input the tags are reconciled; the title, slug (derived
    /// from the new title) and JSON are rewritten only if one of them
    /// differs.
    ///
    /// # Errors
    ///
    /// Returns an error, before any write, if:
    /// - A stored dashboard's title column disagrees with its JSON
    /// - Two stored dashboards share a uid
    /// - An input cannot be read or parsed
    /// - An input's uid is not in the database
    /// - Two inputs share a uid
    ///
    /// Database and file errors after that point abort the run with earlier
    /// dashboards already updated.
    pub fn import_by_uid(&mut self, paths: &[PathBuf]) -> Result<ImportSummary> {
        let (database_records, by_uid) = self.load_by_uid()?;
        let pending = resolve_inputs(paths, &by_uid)?;

        let mut summary = ImportSummary::new(MatchMode::Uid, database_records, pending.len());
        for item in &pending {
            summary.push(self.apply_pending(item)?);
        }
        summary.backup = self.backup.backup_path().map(Path::to_path_buf);

        info!(
            database = summary.database_records,
            inputs = summary.input_documents,
            imported = summary.imported,
            "uid import finished"
        );
        Ok(summary)
    }

    /// Load every stored dashboard keyed by uid.
    ///
    /// Rows without a uid cannot be matched and are left out.
    fn load_by_uid(&self) -> Result<(usize, HashMap<String, StoredEntry>)> {
        let records = self.storage.list_dashboards()?;
        let total = records.len();
        let mut by_uid: HashMap<String, StoredEntry> = HashMap::with_capacity(total);

        for record in records {
            let stored = checked_stored(&record)?;
            let Some(uid) = stored.uid.clone() else {
                warn!(id = record.id, title = %record.title, "Stored dashboard has no uid, it cannot be matched");
                continue;
            };
            if let Some(existing) = by_uid.get(&uid) {
                return Err(Error::DuplicateStoredUid {
                    uid,
                    first_id: existing.record.id,
                    second_id: record.id,
                });
            }
            debug!(%uid, %record, "Loaded stored dashboard");
            by_uid.insert(uid, StoredEntry { record, stored });
        }

        Ok((total, by_uid))
    }

    fn apply_pending(&mut self, item: &PendingImport<'_>) -> Result<ItemOutcome> {
        let doc = &item.parsed.document;
        let record = &item.target.record;
        let old_canonical = &item.target.stored.canonical;

        let tag_diff = plan_tags(self.storage, record.id, &doc.tag_set())?;
        let content_changed = item.parsed.canonical != *old_canonical;
        let needs_write = content_changed || doc.title != record.title || item.slug != record.slug;

        let mut outcome = ItemOutcome {
            path: item.path.to_path_buf(),
            uid: doc.uid.clone(),
            status: ItemStatus::Unchanged,
            id: record.id,
            old_title: record.title.clone(),
            new_title: doc.title.clone(),
            old_slug: record.slug.clone(),
            new_slug: item.slug.clone(),
            content_changed,
            old_bytes: old_canonical.len(),
            new_bytes: item.parsed.canonical.len(),
            tags: None,
            sidecar: None,
            reason: None,
        };

        if tag_diff.is_none() && !needs_write {
            debug!(path = %item.path.display(), uid = %doc.uid, "Dashboard unchanged");
            return Ok(outcome);
        }

        self.backup.ensure_backed_up()?;
        outcome.status = ItemStatus::Updated;

        if let Some(diff) = tag_diff {
            apply_tag_diff(self.storage, record.id, &diff, &doc.label())?;
            outcome.tags = Some(diff);
        }

        if needs_write {
            self.storage.update_dashboard(
                record.id,
                &doc.title,
                &item.slug,
                &item.parsed.canonical,
            )?;
            outcome.sidecar = Some(write_sidecar(item.path, old_canonical)?);
            info!(
                path = %item.path.display(),
                uid = %doc.uid,
                title = %format!("'{}' -> '{}'", record.title, doc.title),
                slug = %format!("'{}' -> '{}'", record.slug, item.slug),
                bytes = %format!("{} -> {}", old_canonical.len(), item.parsed.canonical.len()),
                "Updated dashboard"
            );
        }

        Ok(outcome)
    }

    // ==============
    // title matching
    // ==============

    /// Import each item by looking its dashboard up by title.
    ///
    /// The lookup title is the rename override's old title if given, else
    /// the document's own title. On a uid match the row gets the document's
    /// title, the override's new slug (or keeps its slug), and the
    /// document's canonical JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if an input cannot be read or parsed, no dashboard
    /// has the lookup title, more than one does, or a write fails. Items
    /// before the failing one stay imported.
    pub fn import_by_title(&mut self, items: &[ImportItem]) -> Result<ImportSummary> {
        let database_records = self.storage.count_dashboards()?;
        let mut summary = ImportSummary::new(MatchMode::Title, database_records, items.len());

        for (n, item) in items.iter().enumerate() {
            info!(n = n + 1, path = %item.path.display(), rename = item.rename.is_some(), "Importing json");
            summary.push(self.import_titled(item)?);
        }
        summary.backup = self.backup.backup_path().map(Path::to_path_buf);

        info!(
            inputs = summary.input_documents,
            imported = summary.imported,
            skipped = summary.skipped,
            "title import finished"
        );
        Ok(summary)
    }

    fn import_titled(&mut self, item: &ImportItem) -> Result<ItemOutcome> {
        let parsed = parse_document(&read_file(&item.path)?, &item.path.display().to_string())?;
        let doc = &parsed.document;

        let lookup = item
            .rename
            .as_ref()
            .map_or(doc.title.as_str(), |r| r.old_title.as_str());
        let record = self.find_single(lookup)?;
        let stored = checked_stored(&record)?;

        let new_slug = item
            .rename
            .as_ref()
            .map_or_else(|| record.slug.clone(), |r| r.new_slug.clone());
        let content_changed = parsed.canonical != stored.canonical;

        let mut outcome = ItemOutcome {
            path: item.path.clone(),
            uid: doc.uid.clone(),
            status: ItemStatus::Skipped,
            id: record.id,
            old_title: record.title.clone(),
            new_title: doc.title.clone(),
            old_slug: record.slug.clone(),
            new_slug: new_slug.clone(),
            content_changed,
            old_bytes: stored.canonical.len(),
            new_bytes: parsed.canonical.len(),
            tags: None,
            sidecar: None,
            reason: None,
        };

        let stored_uid = stored.uid.as_deref().unwrap_or_default();
        if stored_uid != doc.uid {
            warn!(
                path = %item.path.display(),
                json_uid = %doc.uid,
                database_uid = stored_uid,
                "UID mismatch, skipping"
            );
            outcome.reason = Some(format!(
                "uid mismatch, json value: {}, database value: {stored_uid}",
                doc.uid
            ));
            return Ok(outcome);
        }

        self.backup.ensure_backed_up()?;
        self.storage
            .update_dashboard(record.id, &doc.title, &new_slug, &parsed.canonical)?;
        outcome.tags = reconcile_tags(self.storage, record.id, &doc.tag_set(), &doc.label())?;
        outcome.sidecar = Some(write_sidecar(&item.path, &stored.canonical)?);

        let renamed = doc.title != record.title || new_slug != record.slug;
        outcome.status = if content_changed || renamed || outcome.tags.is_some() {
            ItemStatus::Updated
        } else {
            ItemStatus::Unchanged
        };

        info!(
            path = %item.path.display(),
            title = %format!("'{lookup}' -> '{}'", doc.title),
            slug = %format!("'{}' -> '{new_slug}'", record.slug),
            tags_updated = outcome.tags.is_some(),
            "Updated dashboard"
        );
        Ok(outcome)
    }

    /// The one dashboard titled `title`.
    fn find_single(&self, title: &str) -> Result<DashboardRecord> {
        let mut rows = self.storage.find_by_title(title)?;
        if rows.len() > 1 {
            return Err(Error::AmbiguousTitle {
                title: title.to_string(),
                count: rows.len(),
            });
        }
        rows.pop().ok_or_else(|| Error::TitleNotFound {
            title: title.to_string(),
        })
    }
}

/// Parse a row's JSON and check it agrees with the title column.
fn checked_stored(record: &DashboardRecord) -> Result<StoredDashboard> {
    let stored = parse_stored(&record.data, &format!("dashboard id {}", record.id))?;
    if stored.title != record.title {
        return Err(Error::InconsistentTitle {
            id: record.id,
            column_title: record.title.clone(),
            data_title: stored.title,
        });
    }
    Ok(stored)
}

/// Read and parse every input, pairing each with its stored dashboard.
fn resolve_inputs<'m>(
    paths: &'m [PathBuf],
    by_uid: &'m HashMap<String, StoredEntry>,
) -> Result<Vec<PendingImport<'m>>> {
    let mut seen: HashMap<String, &Path> = HashMap::with_capacity(paths.len());
    let mut pending = Vec::with_capacity(paths.len());

    for path in paths {
        let parsed = parse_document(&read_file(path)?, &path.display().to_string())?;
        let uid = parsed.document.uid.clone();

        let target = by_uid.get(&uid).ok_or_else(|| Error::UidNotFound {
            path: path.clone(),
            uid: uid.clone(),
            title: parsed.document.title.clone(),
        })?;
        if let Some(other) = seen.insert(uid.clone(), path.as_path()) {
            return Err(Error::DuplicateUid {
                path: path.clone(),
                uid,
                other: other.to_path_buf(),
            });
        }

        let slug = slugify(&parsed.document.title);
        pending.push(PendingImport {
            path: path.as_path(),
            parsed,
            slug,
            target,
        });
    }

    Ok(pending)
}
