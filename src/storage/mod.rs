//! SQLite storage layer for dashsync.
//!
//! Thin adapter over Grafana's `dashboard` and `dashboard_tag` tables. It
//! executes queries and nothing else: matching, diffing and backups live in
//! [`crate::sync`].
//!
//! # Submodules
//!
//! - [`schema`] - DDL of the tables dashsync touches (test fixtures only)
//! - [`sqlite`] - The storage implementation

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteStorage;
