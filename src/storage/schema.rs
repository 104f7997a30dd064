//! Grafana dashboard tables.
//!
//! dashsync never creates or migrates tables in an operator's database; the
//! `dashboard` and `dashboard_tag` tables belong to Grafana. This DDL is the
//! subset of Grafana's schema the reconciliation engine reads and writes,
//! used to build scratch databases for tests and in-memory storage.

use rusqlite::{Connection, Result};

/// The columns dashsync relies on, as Grafana lays them out.
pub const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS dashboard (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    title TEXT NOT NULL,
    slug TEXT NOT NULL,
    data TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS dashboard_tag (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    dashboard_id INTEGER NOT NULL,
    term TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_dashboard_tag_dashboard_id ON dashboard_tag(dashboard_id);
";

/// Create the dashboard tables on `conn`.
///
/// # Errors
///
/// Returns an error if the DDL fails.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
