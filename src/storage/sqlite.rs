//! SQLite storage implementation.
//!
//! Wraps a single connection to a Grafana database. The connection is closed
//! when the storage value is dropped, so every command that opens one
//! releases it on all exit paths, including errors.
//!
//! Writes are issued as individual statements. Nothing here opens a
//! transaction: a run that fails half way leaves earlier dashboards updated,
//! and the operator restores from the run backup if needed.

use crate::error::{Error, Result};
use crate::model::{DashboardRecord, TagSet};
use rusqlite::{Connection, OpenFlags, Row};
use std::path::Path;
use std::time::Duration;

/// How long a statement waits on a lock held by Grafana.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based dashboard storage.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<DashboardRecord> {
    Ok(DashboardRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        data: row.get(3)?,
    })
}

impl SqliteStorage {
    /// Open an existing database at the given path.
    ///
    /// The file is opened read-write but never created: a mistyped path is an
    /// error, not a fresh empty database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open(path: &Path) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        Ok(Self { conn })
    }

    /// Open an in-memory database with the dashboard tables (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        crate::storage::schema::apply_schema(&conn)?;
        Ok(Self { conn })
    }

    // ====================
    // Dashboard Operations
    // ====================

    /// Load every dashboard row, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_dashboards(&self) -> Result<Vec<DashboardRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, slug, data FROM dashboard ORDER BY id")?;
        let rows = stmt.query_map([], record_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Number of dashboard rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_dashboards(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM dashboard", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Load every dashboard whose title column equals `title`.
    ///
    /// Grafana does not enforce unique titles, so this may return more than
    /// one row.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_by_title(&self, title: &str) -> Result<Vec<DashboardRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, slug, data FROM dashboard WHERE title = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([title], record_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Overwrite a dashboard's title, slug and JSON in one statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails or no row has this id.
    pub fn update_dashboard(&self, id: i64, title: &str, slug: &str, data: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE dashboard SET title = ?1, slug = ?2, data = ?3 WHERE id = ?4",
            rusqlite::params![title, slug, data, id],
        )?;
        if changed == 0 {
            return Err(Error::Other(format!(
                "dashboard id {id} disappeared while updating it"
            )));
        }
        Ok(())
    }

    // ==============
    // Tag Operations
    // ==============

    /// Tags currently associated with a dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn dashboard_tags(&self, dashboard_id: i64) -> Result<TagSet> {
        let mut stmt = self.conn.prepare(
            "SELECT term FROM dashboard_tag WHERE dashboard_id = ?1 ORDER BY term ASC",
        )?;
        let rows = stmt.query_map([dashboard_id], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<rusqlite::Result<TagSet>>()?)
    }

    /// Associate a tag with a dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_tag(&self, dashboard_id: i64, term: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO dashboard_tag (dashboard_id, term) VALUES (?1, ?2)",
            rusqlite::params![dashboard_id, term],
        )?;
        Ok(())
    }

    /// Remove a tag association. Returns the number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_tag(&self, dashboard_id: i64, term: &str) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM dashboard_tag WHERE dashboard_id = ?1 AND term = ?2",
            rusqlite::params![dashboard_id, term],
        )?;
        Ok(deleted)
    }
}

#[cfg(test)]
impl SqliteStorage {
    /// Create a file-backed database with the dashboard tables.
    pub(crate) fn create_fixture(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        crate::storage::schema::apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Insert a dashboard row the way Grafana would.
    pub(crate) fn insert_dashboard(&self, title: &str, slug: &str, data: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO dashboard (title, slug, data) VALUES (?1, ?2, ?3)",
            rusqlite::params![title, slug, data],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}
