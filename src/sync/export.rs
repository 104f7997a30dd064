//! Dashboard export.
//!
//! Writes every dashboard row's JSON, in canonical form, to
//! `<output_dir>/<slug>.json`. Export only reads the database, so it takes
//! no backup. The first failing write aborts the remaining exports.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::DashboardRecord;
use crate::storage::SqliteStorage;
use crate::sync::codec::canonicalize;
use crate::sync::file::atomic_write;
use crate::sync::slug::slugify;
use crate::sync::types::{ExportStats, ExportedFile};

/// Exporter for dashboard JSON files.
pub struct Exporter<'a> {
    storage: &'a SqliteStorage,
    output_dir: PathBuf,
}

impl<'a> Exporter<'a> {
    /// Create a new exporter writing into `output_dir`.
    #[must_use]
    pub fn new(storage: &'a SqliteStorage, output_dir: PathBuf) -> Self {
        Self {
            storage,
            output_dir,
        }
    }

    /// Get the output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Export all dashboards.
    ///
    /// Existing files with the same slug are overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The dashboard query fails
    /// - A stored dashboard is not valid JSON
    /// - A dashboard has neither a slug nor a sluggable title
    /// - A file write fails
    pub fn export(&self) -> Result<ExportStats> {
        let records = self.storage.list_dashboards()?;
        debug!(count = records.len(), dir = %self.output_dir.display(), "Exporting dashboards");

        let mut stats = ExportStats {
            output_dir: self.output_dir.clone(),
            files: Vec::with_capacity(records.len()),
        };

        for record in records {
            stats.files.push(self.export_one(record)?);
        }

        Ok(stats)
    }

    fn export_one(&self, record: DashboardRecord) -> Result<ExportedFile> {
        let slug = export_slug(&record)?;
        let path = export_path(&self.output_dir, &slug);
        let canonical = canonicalize(record.data.as_bytes(), &format!("dashboard id {}", record.id))?;

        atomic_write(&path, canonical.as_bytes())?;
        info!(title = %record.title, path = %path.display(), "Written dashboard");

        Ok(ExportedFile {
            id: record.id,
            title: record.title,
            slug,
            path,
        })
    }
}

/// Slug used for a record's file name: the stored slug, or the slugified
/// title when the column is empty.
fn export_slug(record: &DashboardRecord) -> Result<String> {
    let slug = if record.slug.is_empty() {
        slugify(&record.title)
    } else {
        record.slug.clone()
    };
    if slug.is_empty() {
        return Err(Error::EmptySlug {
            id: record.id,
            title: record.title.clone(),
        });
    }
    Ok(slug)
}

/// File a dashboard with `slug` is exported to.
#[must_use]
pub fn export_path(output_dir: &Path, slug: &str) -> PathBuf {
    output_dir.join(format!("{slug}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_export_empty_database() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SqliteStorage::open_memory().unwrap();

        let stats = Exporter::new(&storage, temp_dir.path().join("out"))
            .export()
            .unwrap();
        assert!(stats.is_empty());
    }

    #[test]
    fn test_export_writes_canonical_json_by_slug() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("sqlite");
        let storage = SqliteStorage::open_memory().unwrap();
        storage
            .insert_dashboard("CPU", "cpu", r#"{"uid":"abc","title":"CPU"}"#)
            .unwrap();
        storage
            .insert_dashboard("Disk IO", "disk-io", r#"{"title":"Disk IO","uid":"def"}"#)
            .unwrap();

        let exporter = Exporter::new(&storage, out.clone());
        let stats = exporter.export().unwrap();

        assert_eq!(stats.total(), 2);
        assert_eq!(stats.files[1].path, out.join("disk-io.json"));
        let written = fs::read_to_string(out.join("cpu.json")).unwrap();
        assert_eq!(written, "{\n  \"title\": \"CPU\",\n  \"uid\": \"abc\"\n}");
    }

    #[test]
    fn test_export_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SqliteStorage::open_memory().unwrap();
        storage
            .insert_dashboard("CPU", "cpu", r#"{"title":"CPU","uid":"abc"}"#)
            .unwrap();
        fs::write(temp_dir.path().join("cpu.json"), "stale").unwrap();

        Exporter::new(&storage, temp_dir.path().to_path_buf())
            .export()
            .unwrap();

        let written = fs::read_to_string(temp_dir.path().join("cpu.json")).unwrap();
        assert!(written.contains("\"uid\": \"abc\""));
    }

    #[test]
    fn test_export_empty_slug_falls_back_to_title() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SqliteStorage::open_memory().unwrap();
        storage
            .insert_dashboard("Net Errors", "", r#"{"title":"Net Errors","uid":"n"}"#)
            .unwrap();
        storage.insert_dashboard("!!!", "", r#"{"title":"!!!"}"#).unwrap();

        let err = Exporter::new(&storage, temp_dir.path().to_path_buf())
            .export()
            .unwrap_err();
        assert!(matches!(err, Error::EmptySlug { .. }));
        assert!(temp_dir.path().join("net-errors.json").exists());
    }

    #[test]
    fn test_export_invalid_stored_json_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SqliteStorage::open_memory().unwrap();
        storage.insert_dashboard("Bad", "bad", "{not json").unwrap();

        let err = Exporter::new(&storage, temp_dir.path().to_path_buf())
            .export()
            .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}
