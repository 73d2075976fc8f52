//! Filesystem probes: existence, mtime reads, mtime writes.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use filetime::FileTime;
use tracing::debug;

use crate::core::stamp::Stamp;

/// Whether `path` currently exists.
pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Read `path`'s modification time.
///
/// Returns [`Stamp::epoch`] when the path is absent or unreadable, so a
/// caller that cares about absence must check [`exists`] first.
pub fn mtime(path: &Path) -> Stamp {
    match fs::metadata(path) {
        Ok(meta) => Stamp::from_file_time(FileTime::from_last_modification_time(&meta)),
        Err(_) => Stamp::epoch(),
    }
}

/// Set `path`'s modification time without touching its contents.
pub fn set_mtime(path: &Path, stamp: Stamp) -> Result<()> {
    debug!(path = %path.display(), stamp = %stamp, "set mtime");
    filetime::set_file_mtime(path, stamp.file_time())
        .with_context(|| format!("set mtime of {}", path.display()))
}
