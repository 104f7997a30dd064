//! File operations for sync.
//!
//! Every write goes through [`atomic_write`]: the content lands in a
//! temporary sibling file, is synced to disk, and is renamed over the target.
//! A crash mid-write never leaves a truncated export, sidecar or backup.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// `path` with `suffix` appended to the file name (`a.json` -> `a.json.was`).
#[must_use]
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Read a whole file, naming the path in the error.
///
/// # Errors
///
/// Returns [`Error::File`] if the file cannot be read.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::file(path, e))
}

/// Write content to a file atomically.
///
/// This function:
/// 1. Creates the parent directory if needed
/// 2. Writes content to `<path>.tmp`
/// 3. Calls `fsync` to ensure data is on disk
/// 4. Renames the temp file to the target path
///
/// If any step fails, the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns [`Error::File`] naming the path that failed.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let temp_path = with_suffix(path, ".tmp");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::file(parent, e))?;
    }

    {
        let file = File::create(&temp_path).map_err(|e| Error::file(&temp_path, e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(content)
            .and_then(|()| writer.flush())
            .and_then(|()| writer.get_ref().sync_all())
            .map_err(|e| Error::file(&temp_path, e))?;
    }

    fs::rename(&temp_path, path).map_err(|e| Error::file(path, e))?;

    Ok(())
}
