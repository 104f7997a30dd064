//! Run backups.
//!
//! Two kinds of rollback material are produced during an import:
//!
//! - one full copy of the database file per run, written lazily the first
//!   time something is about to change, named `<db>.<unix-nanoseconds>`;
//! - one `<input>.was` sidecar per updated dashboard holding the canonical
//!   JSON the database had before the update.
//!
//! The database bytes are captured when the [`BackupManager`] is created,
//! before any statement runs, so the backup is the pre-run state even though
//! it is written later.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::error::{Error, Result};
use crate::sync::file::{atomic_write, read_file, with_suffix};

/// Suffix of per-dashboard pre-update snapshots.
pub const SIDECAR_SUFFIX: &str = ".was";

/// Once-per-run database backup.
#[derive(Debug)]
pub struct BackupManager {
    db_path: PathBuf,
    original: Vec<u8>,
    backup_path: Option<PathBuf>,
}

impl BackupManager {
    /// Read the database file into memory.
    ///
    /// Call this before opening the database for writing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::File`] if the database cannot be read.
    pub fn capture(db_path: &Path) -> Result<Self> {
        let original = read_file(db_path)?;
        Ok(Self {
            db_path: db_path.to_path_buf(),
            original,
            backup_path: None,
        })
    }

    /// Write the captured bytes to `<db>.<unix-nanoseconds>` unless this run
    /// already did. Returns the backup path either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the clock is out of range or the write fails.
    pub fn ensure_backed_up(&mut self) -> Result<&Path> {
        let path = match self.backup_path.take() {
            Some(path) => path,
            None => {
                let nanos = Utc::now()
                    .timestamp_nanos_opt()
                    .ok_or_else(|| Error::Other("system clock out of range".to_string()))?;
                let path = with_suffix(&self.db_path, &format!(".{nanos}"));
                atomic_write(&path, &self.original)?;
                info!(path = %path.display(), bytes = self.original.len(), "Original db file backed up");
                path
            }
        };
        Ok(self.backup_path.insert(path).as_path())
    }

    /// Path of the backup written by this run, if any.
    #[must_use]
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup_path.as_deref()
    }
}

/// Path of the pre-update snapshot for an input file.
#[must_use]
pub fn sidecar_path(input: &Path) -> PathBuf {
    with_suffix(input, SIDECAR_SUFFIX)
}

/// Save the database's pre-update JSON next to the input file.
///
/// # Errors
///
/// Returns [`Error::File`] if the sidecar cannot be written.
pub fn write_sidecar(input: &Path, previous: &str) -> Result<PathBuf> {
    let path = sidecar_path(input);
    atomic_write(&path, previous.as_bytes())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn backups_of(dir: &Path, db_name: &str) -> Vec<PathBuf> {
        let prefix = format!("{db_name}.");
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect()
    }

    #[test]
    fn test_backup_written_once_with_original_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let db = temp_dir.path().join("grafana.db");
        fs::write(&db, b"before").unwrap();

        let started = Utc::now().timestamp_nanos_opt().unwrap();
        let mut backup = BackupManager::capture(&db).unwrap();
        assert!(backup.backup_path().is_none());

        // The run mutates the database before the first backup call.
        fs::write(&db, b"after").unwrap();

        let first = backup.ensure_backed_up().unwrap().to_path_buf();
        let second = backup.ensure_backed_up().unwrap().to_path_buf();
        assert_eq!(first, second);
        assert_eq!(fs::read(&first).unwrap(), b"before");
        assert_eq!(backups_of(temp_dir.path(), "grafana.db"), vec![first.clone()]);

        let suffix: i64 = first
            .extension()
            .and_then(|e| e.to_str())
            .unwrap()
            .parse()
            .unwrap();
        assert!(suffix >= started);
    }

    #[test]
    fn test_capture_missing_database_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = BackupManager::capture(&temp_dir.path().join("missing.db"));
        assert!(matches!(result, Err(Error::File { .. })));
    }

    #[test]
    fn test_write_sidecar() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("cpu.json");

        let path = write_sidecar(&input, "{\n  \"title\": \"CPU\"\n}").unwrap();
        assert_eq!(path, temp_dir.path().join("cpu.json.was"));
        assert!(fs::read_to_string(&path).unwrap().contains("CPU"));
    }
}
