//! Error types for dashsync.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=database, 3=lookup, 4=input, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for `--json` consumers
//!
//! Every variant is fatal. The one soft condition in the reconciliation
//! engine (a uid mismatch during title matching) is reported as an
//! [`ItemOutcome`](crate::sync::ItemOutcome), never as an `Error`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dashsync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    DatabaseError,
    InconsistentRecord,

    // Lookup (exit 3)
    UidNotFound,
    TitleNotFound,
    AmbiguousTitle,

    // Input (exit 4)
    ParseError,
    DuplicateUid,
    InvalidItem,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::DatabaseError => "DATABASE_ERROR",
            Self::InconsistentRecord => "INCONSISTENT_RECORD",
            Self::UidNotFound => "UID_NOT_FOUND",
            Self::TitleNotFound => "TITLE_NOT_FOUND",
            Self::AmbiguousTitle => "AMBIGUOUS_TITLE",
            Self::ParseError => "PARSE_ERROR",
            Self::DuplicateUid => "DUPLICATE_UID",
            Self::InvalidItem => "INVALID_ITEM",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::DatabaseError | Self::InconsistentRecord => 2,
            Self::UidNotFound | Self::TitleNotFound | Self::AmbiguousTitle => 3,
            Self::ParseError | Self::DuplicateUid | Self::InvalidItem => 4,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur while exporting or importing dashboards.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed JSON or a missing/empty required field.
    #[error("{origin}: invalid dashboard JSON: {message}")]
    Parse { origin: String, message: String },

    /// The `title` column disagrees with the title embedded in `data`.
    #[error("SQLite internal inconsistency: dashboard id {id} has title '{column_title}' but its JSON says '{data_title}'")]
    InconsistentTitle {
        id: i64,
        column_title: String,
        data_title: String,
    },

    #[error("SQLite internal inconsistency: dashboards {first_id} and {second_id} share uid '{uid}'")]
    DuplicateStoredUid {
        uid: String,
        first_id: i64,
        second_id: i64,
    },

    #[error("dashboard id {id} ('{title}') has no usable slug to export to")]
    EmptySlug { id: i64, title: String },

    #[error("{path}: uid={uid} not found in SQLite, attempted to import '{title}'")]
    UidNotFound {
        path: PathBuf,
        uid: String,
        title: String,
    },

    #[error("dashboard titled '{title}' not found")]
    TitleNotFound { title: String },

    #[error("dashboard title '{title}' is ambiguous: {count} dashboards share it")]
    AmbiguousTitle { title: String, count: usize },

    #[error("{path}: duplicate json uid '{uid}', collides with {other}")]
    DuplicateUid {
        path: PathBuf,
        uid: String,
        other: PathBuf,
    },

    #[error("invalid import item '{0}'")]
    InvalidItem(String),

    #[error("{path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a [`Error::Parse`] for the named input.
    pub fn parse(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Attach the offending path to an I/O error.
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Parse { .. } => ErrorCode::ParseError,
            Self::InconsistentTitle { .. }
            | Self::DuplicateStoredUid { .. }
            | Self::EmptySlug { .. } => ErrorCode::InconsistentRecord,
            Self::UidNotFound { .. } => ErrorCode::UidNotFound,
            Self::TitleNotFound { .. } => ErrorCode::TitleNotFound,
            Self::AmbiguousTitle { .. } => ErrorCode::AmbiguousTitle,
            Self::DuplicateUid { .. } => ErrorCode::DuplicateUid,
            Self::InvalidItem(_) => ErrorCode::InvalidItem,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::File { .. } => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Recovery hint for the operator.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::InvalidItem(_) => Some(
                "Give each item either as 'file.json' or as 'file.json;old title;new slug'"
                    .to_string(),
            ),

            Self::UidNotFound { .. } => Some(
                "Identifier matching only updates existing dashboards. \
                 Create the dashboard in Grafana first, or import by title."
                    .to_string(),
            ),

            Self::TitleNotFound { .. } => Some(
                "If the dashboard was renamed, pass 'file.json;old title;new slug'".to_string(),
            ),

            Self::AmbiguousTitle { .. } => Some(
                "Several dashboards share this title. Rename them in Grafana or import with \
                 DASHSYNC_UID_MODE=1 to match by uid instead."
                    .to_string(),
            ),

            Self::InconsistentTitle { .. } | Self::DuplicateStoredUid { .. } => Some(
                "The database was modified outside Grafana. Restore it from a backup before syncing."
                    .to_string(),
            ),

            Self::Parse { .. }
            | Self::DuplicateUid { .. }
            | Self::EmptySlug { .. }
            | Self::File { .. }
            | Self::Database(_)
            | Self::Json(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::parse("a.json", "missing uid").exit_code(), 4);
        assert_eq!(
            Error::TitleNotFound {
                title: "CPU".into()
            }
            .exit_code(),
            3
        );
        assert_eq!(
            Error::InconsistentTitle {
                id: 1,
                column_title: "a".into(),
                data_title: "b".into(),
            }
            .exit_code(),
            2
        );
        assert_eq!(
            Error::file("x", std::io::Error::other("boom")).exit_code(),
            8
        );
    }

    #[test]
    fn test_message_names_offending_item() {
        let err = Error::UidNotFound {
            path: PathBuf::from("dash/cpu.json"),
            uid: "abc123".into(),
            title: "CPU".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("dash/cpu.json"));
        assert!(msg.contains("abc123"));
        assert!(msg.contains("CPU"));
    }

    #[test]
    fn test_structured_json_includes_hint() {
        let err = Error::InvalidItem("a.json;only-two".into());
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "INVALID_ITEM");
        assert_eq!(json["error"]["exit_code"], 4);
        assert!(json["error"]["hint"].is_string());
    }
}
