//! Dashboard JSON codec.
//!
//! Two jobs: pull the reconciliation fields (`title`, `uid`, `tags`) out of a
//! dashboard document, and render any document in its canonical form.
//!
//! The canonical form is `serde_json`'s pretty printer (two-space indent)
//! over a `Value` whose objects are `BTreeMap`-backed, so keys come out
//! sorted. Two documents that differ only in key order or whitespace have
//! byte-identical canonical forms, and every "did this change" decision in
//! the crate is a plain string comparison of canonical forms.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{DashboardDocument, TagSet};

/// Loose view of the fields we care about; everything else is ignored here.
#[derive(Deserialize)]
struct RawDashboard {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    uid: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// An input document together with its canonical bytes.
#[derive(Debug, Clone)]
pub struct ParsedDashboard {
    pub document: DashboardDocument,
    pub canonical: String,
}

/// The fields recovered from a `dashboard.data` column.
///
/// Unlike input documents, stored dashboards may predate uids.
#[derive(Debug, Clone)]
pub struct StoredDashboard {
    pub title: String,
    pub uid: Option<String>,
    pub tags: TagSet,
    pub canonical: String,
}

fn parse_value(bytes: &[u8], origin: &str) -> Result<Value> {
    serde_json::from_slice(bytes).map_err(|e| Error::parse(origin, e.to_string()))
}

fn raw_fields(value: &Value, origin: &str) -> Result<RawDashboard> {
    if !value.is_object() {
        return Err(Error::parse(origin, "top-level value is not an object"));
    }
    RawDashboard::deserialize(value).map_err(|e| Error::parse(origin, e.to_string()))
}

fn render(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Render arbitrary JSON bytes in canonical form.
///
/// # Errors
///
/// Returns [`Error::Parse`] if `bytes` is not well-formed JSON.
pub fn canonicalize(bytes: &[u8], origin: &str) -> Result<String> {
    render(&parse_value(bytes, origin)?)
}

/// Parse an input dashboard document.
///
/// `origin` names the input in error messages (usually the file path).
///
/// # Errors
///
/// Returns [`Error::Parse`] if the JSON is malformed, if `title` or `uid` is
/// missing or empty, or if `tags` is not a list of strings.
pub fn parse_document(bytes: &[u8], origin: &str) -> Result<ParsedDashboard> {
    let value = parse_value(bytes, origin)?;
    let raw = raw_fields(&value, origin)?;

    let title = raw
        .title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::parse(origin, "missing or empty \"title\""))?;
    let uid = raw
        .uid
        .filter(|u| !u.is_empty())
        .ok_or_else(|| Error::parse(origin, "missing or empty \"uid\""))?;

    Ok(ParsedDashboard {
        document: DashboardDocument {
            title,
            uid,
            tags: raw.tags.unwrap_or_default(),
        },
        canonical: render(&value)?,
    })
}

/// Parse the JSON stored in a `dashboard.data` column.
///
/// A missing title reads as the empty string so the caller's consistency
/// check reports it; a missing or empty uid reads as `None`.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the JSON is malformed or a field has the
/// wrong type.
pub fn parse_stored(data: &str, origin: &str) -> Result<StoredDashboard> {
    let value = parse_value(data.as_bytes(), origin)?;
    let raw = raw_fields(&value, origin)?;

    Ok(StoredDashboard {
        title: raw.title.unwrap_or_default(),
        uid: raw.uid.filter(|u| !u.is_empty()),
        tags: raw.tags.unwrap_or_default().into_iter().collect(),
        canonical: render(&value)?,
    })
}
