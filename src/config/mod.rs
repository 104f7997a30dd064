//! Configuration management.
//!
//! Resolves the settings of one run from the parsed command line and the
//! environment. The environment is read once, here, at startup; nothing
//! below this module looks at it.
//!
//! | Variable               | Effect                                      |
//! |------------------------|---------------------------------------------|
//! | `DASHSYNC_UID_MODE`    | Import by uid instead of title when truthy  |
//! | `DASHSYNC_EXPORT_DIR`  | Export directory (read by clap)             |
//! | `RUST_LOG`             | Log filter, overrides `-v`                  |

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::sync::MatchMode;

/// Environment toggle selecting uid matching.
pub const UID_MODE_ENV: &str = "DASHSYNC_UID_MODE";

/// Export directory used when none is configured.
pub const DEFAULT_EXPORT_DIR: &str = "sqlite";

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Grafana SQLite database file.
    pub db_path: PathBuf,
    /// Where exported JSON files go.
    pub export_dir: PathBuf,
    /// Import matching strategy.
    pub mode: MatchMode,
}

impl Settings {
    /// Build settings from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the database file does not exist.
    pub fn new(db_path: &Path, export_dir: Option<&Path>, mode: MatchMode) -> Result<Self> {
        if db_path.as_os_str().is_empty() {
            return Err(Error::Config("database path is empty".to_string()));
        }
        if !db_path.is_file() {
            return Err(Error::Config(format!(
                "database file '{}' does not exist",
                db_path.display()
            )));
        }

        Ok(Self {
            db_path: db_path.to_path_buf(),
            export_dir: resolve_export_dir(export_dir),
            mode,
        })
    }

    /// Build settings from the command line, consulting [`UID_MODE_ENV`].
    ///
    /// Uid matching is on if `by_uid` is set or the environment toggle is
    /// truthy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the database file does not exist.
    pub fn resolve(db_path: &Path, export_dir: Option<&Path>, by_uid: bool) -> Result<Self> {
        let mode = if by_uid || is_uid_mode() {
            MatchMode::Uid
        } else {
            MatchMode::Title
        };
        Self::new(db_path, export_dir, mode)
    }
}

/// Whether [`UID_MODE_ENV`] is set to a truthy value.
#[must_use]
pub fn is_uid_mode() -> bool {
    std::env::var(UID_MODE_ENV).is_ok_and(|v| is_truthy(&v))
}

/// Anything but empty, `0` or `false` (any case) counts as set.
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

/// Export directory: the explicit one, else [`DEFAULT_EXPORT_DIR`].
#[must_use]
pub fn resolve_export_dir(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from(DEFAULT_EXPORT_DIR),
    }
}
