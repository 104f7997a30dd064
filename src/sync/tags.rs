//! Tag reconciliation.
//!
//! Makes a dashboard's `dashboard_tag` rows match the `tags` list of its
//! JSON document. The diff is computed first as a plain value so callers
//! can take the run backup before the first tag statement goes out.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::model::TagSet;
use crate::storage::SqliteStorage;

/// Tag statements needed to turn the stored set into the desired one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagDiff {
    /// Tags present in JSON but not in the database.
    pub insert: Vec<String>,
    /// Tags present in the database but not in JSON.
    pub delete: Vec<String>,
}

impl TagDiff {
    /// Diff `current` (database) against `desired` (JSON).
    ///
    /// Returns `None` when the sets compare equal, which short-circuits
    /// before any set difference is computed.
    #[must_use]
    pub fn compute(current: &TagSet, desired: &TagSet) -> Option<Self> {
        if current.same_as(desired) {
            return None;
        }
        Some(Self {
            insert: desired.missing_from(current),
            delete: current.missing_from(desired),
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.insert.is_empty() && self.delete.is_empty()
    }
}

/// Issue one statement per tag in `diff`.
///
/// There is no transaction: a failure part way leaves the tags partially
/// updated.
///
/// # Errors
///
/// Returns an error if any insert or delete fails.
pub fn apply_tag_diff(
    storage: &SqliteStorage,
    dashboard_id: i64,
    diff: &TagDiff,
    label: &str,
) -> Result<()> {
    for tag in &diff.insert {
        storage.insert_tag(dashboard_id, tag)?;
        debug!(dashboard = label, id = dashboard_id, tag, "Inserted tag");
    }
    for tag in &diff.delete {
        storage.delete_tag(dashboard_id, tag)?;
        debug!(dashboard = label, id = dashboard_id, tag, "Deleted tag");
    }
    info!(
        dashboard = label,
        id = dashboard_id,
        added = diff.insert.len(),
        removed = diff.delete.len(),
        "Updated dashboard tags"
    );
    Ok(())
}

/// Read a dashboard's stored tags and diff them against `desired`.
///
/// # Errors
///
/// Returns an error if the tag query fails.
pub fn plan_tags(
    storage: &SqliteStorage,
    dashboard_id: i64,
    desired: &TagSet,
) -> Result<Option<TagDiff>> {
    let current = storage.dashboard_tags(dashboard_id)?;
    let diff = TagDiff::compute(&current, desired);
    if let Some(diff) = &diff {
        debug!(
            id = dashboard_id,
            from = %current,
            to = %desired,
            insert = diff.insert.len(),
            delete = diff.delete.len(),
            "Tag sets differ"
        );
    }
    Ok(diff)
}

/// Plan and apply in one go. Returns the applied diff, or `None` if the tags
/// already matched.
///
/// # Errors
///
/// Returns an error if the query or any tag statement fails.
pub fn reconcile_tags(
    storage: &SqliteStorage,
    dashboard_id: i64,
    desired: &TagSet,
    label: &str,
) -> Result<Option<TagDiff>> {
    let diff = plan_tags(storage, dashboard_id, desired)?;
    if let Some(diff) = &diff {
        apply_tag_diff(storage, dashboard_id, diff, label)?;
    }
    Ok(diff)
}
