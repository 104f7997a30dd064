//! Dashboard model.
//!
//! A dashboard lives in two places: as a row in Grafana's `dashboard`
//! table ([`DashboardRecord`]) and as a JSON document on disk
//! ([`DashboardDocument`]). The record's `data` column holds the full JSON,
//! which is the source of truth for the uid and the tag list.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A row of the `dashboard` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardRecord {
    /// Primary key, assigned by Grafana.
    pub id: i64,

    /// Title column. Must equal the `title` inside `data`.
    pub title: String,

    /// URL slug column.
    pub slug: String,

    /// Serialized dashboard JSON.
    pub data: String,
}

impl fmt::Display for DashboardRecord {
    // Skip the JSON body, it can be hundreds of kilobytes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{id:{}, title:'{}', slug:'{}', data:len:{}}}",
            self.id,
            self.title,
            self.slug,
            self.data.len()
        )
    }
}

/// The reconciliation-relevant fields of a dashboard JSON document.
///
/// Every other field is carried verbatim in the canonical bytes produced by
/// [`crate::sync::canonicalize`]; this struct never round-trips on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardDocument {
    pub title: String,
    pub uid: String,
    pub tags: Vec<String>,
}

impl DashboardDocument {
    /// The document's tags as a set.
    #[must_use]
    pub fn tag_set(&self) -> TagSet {
        self.tags.iter().cloned().collect()
    }

    /// Short `uid title` label used in log lines.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.uid, self.title)
    }
}

/// A set of dashboard tags.
///
/// Members are kept sorted, so [`TagSet::joined`] is stable. Equality for
/// reconciliation purposes ([`TagSet::same_as`]) ignores case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Sorted, comma-joined members.
    #[must_use]
    pub fn joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(",")
    }

    /// Case-insensitive comparison of the sorted-joined forms.
    #[must_use]
    pub fn same_as(&self, other: &TagSet) -> bool {
        folded_join(self) == folded_join(other)
    }

    /// Members of `self` that are not in `other`, in sorted order.
    #[must_use]
    pub fn missing_from(&self, other: &TagSet) -> Vec<String> {
        self.0.difference(&other.0).cloned().collect()
    }
}

/// Lowercased members, re-sorted and joined. Members that differ only in
/// case stay distinct entries.
fn folded_join(tags: &TagSet) -> String {
    let mut folded: Vec<String> = tags.iter().map(str::to_lowercase).collect();
    folded.sort_unstable();
    folded.join(",")
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.joined())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_set_sorts_and_dedups() {
        let tags: TagSet = ["perf", "infra", "perf"].into_iter().collect();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags.joined(), "infra,perf");
    }

    #[test]
    fn test_same_as_ignores_case_and_order() {
        let a: TagSet = ["Infra", "perf"].into_iter().collect();
        let b: TagSet = ["perf", "infra"].into_iter().collect();
        assert!(a.same_as(&b));

        let c: TagSet = ["perf", "net"].into_iter().collect();
        assert!(!a.same_as(&c));

        let both_cases: TagSet = ["A", "a"].into_iter().collect();
        let lower: TagSet = ["a"].into_iter().collect();
        assert!(!both_cases.same_as(&lower));
    }

    #[test]
    fn test_missing_from() {
        let json: TagSet = ["infra", "perf"].into_iter().collect();
        let db: TagSet = ["perf", "net"].into_iter().collect();
        assert_eq!(json.missing_from(&db), vec!["infra".to_string()]);
        assert_eq!(db.missing_from(&json), vec!["net".to_string()]);
    }

    #[test]
    fn test_record_display_hides_data() {
        let record = DashboardRecord {
            id: 7,
            title: "CPU".into(),
            slug: "cpu".into(),
            data: "{\"title\":\"CPU\"}".into(),
        };
        assert_eq!(record.to_string(), "{id:7, title:'CPU', slug:'cpu', data:len:15}");
    }
}
