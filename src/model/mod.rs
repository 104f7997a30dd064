//! Data models for dashsync.
//!
//! - [`DashboardRecord`]: a row of Grafana's `dashboard` table
//! - [`DashboardDocument`]: the reconciliation fields of a dashboard JSON file
//! - [`TagSet`]: a dashboard's tags

pub mod dashboard;

pub use dashboard::{DashboardDocument, DashboardRecord, TagSet};
