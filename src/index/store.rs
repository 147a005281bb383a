//! Atomic JSON persistence for the release index
//!
//! Documents are written to a temporary file in the target's directory,
//! flushed to durable storage, then renamed over the target. A reader never
//! observes a partially written document, and a failure before the rename
//! leaves the original file untouched (the temporary is cleaned up).
//!
//! Rename-based writes are atomic per file but do not coordinate concurrent
//! writers: two staging runs against the same index can still lose an
//! update to a stale read-modify-write. Callers are expected to serialize
//! invocations.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::RelstageError;
use crate::index::model::ReleaseIndex;
use crate::version::Version;

/// Load the release index from `path`
///
/// A missing file is not an error: the parent directory tree is created and
/// an empty document is durably written before being read back. An existing
/// file that is not valid JSON of the index shape, or that contains
/// unparsable version strings, fails with [`RelstageError::CorruptIndex`].
pub fn load(path: &Path) -> Result<ReleaseIndex, RelstageError> {
    if !path.exists() {
        fs::create_dir_all(parent_dir(path)).map_err(|e| {
            RelstageError::persistence(path, "failed to create index directory", e)
        })?;
        save(path, &ReleaseIndex::new())?;
    }

    let content = fs::read_to_string(path)
        .map_err(|e| RelstageError::persistence(path, "failed to read index", e))?;

    let index: ReleaseIndex = serde_json::from_str(&content)
        .map_err(|e| RelstageError::corrupt_index(path, e.to_string()))?;

    ensure_well_formed(path, &index)?;
    Ok(index)
}

/// Persist the release index to `path`, atomically
pub fn save(path: &Path, index: &ReleaseIndex) -> Result<(), RelstageError> {
    save_json(path, index)
}

/// Atomically write any serializable document as pretty JSON
///
/// Used for both the index and the per-artifact descriptor files.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), RelstageError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| RelstageError::Persistence {
        path: path.to_path_buf(),
        message: format!("failed to serialize document: {}", e),
        source: None,
    })?;

    let dir = parent_dir(path);
    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| RelstageError::persistence(path, "failed to create temporary file", e))?;

    tmp.write_all(&bytes)
        .map_err(|e| RelstageError::persistence(path, "failed to write temporary file", e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| RelstageError::persistence(path, "failed to flush temporary file", e))?;

    // Dropping the temp file on any error above removes it; persist() hands
    // it back on rename failure so the same cleanup applies.
    tmp.persist(path)
        .map_err(|e| RelstageError::persistence(path, "failed to move document into place", e.error))?;

    fsync_dir(dir).ok();
    Ok(())
}

/// Enforce the index invariant at the trust boundary: every `latest`
/// pointer and every version key must parse, so in-memory operations never
/// meet an unparsable stored version.
fn ensure_well_formed(path: &Path, index: &ReleaseIndex) -> Result<(), RelstageError> {
    for (name, entry) in index.packages() {
        Version::parse(&entry.latest).map_err(|_| {
            RelstageError::corrupt_index(
                path,
                format!(
                    "package '{}' has unparsable latest version '{}'",
                    name, entry.latest
                ),
            )
        })?;

        for version in entry.versions.keys() {
            Version::parse(version).map_err(|_| {
                RelstageError::corrupt_index(
                    path,
                    format!("package '{}' has unparsable version key '{}'", name, version),
                )
            })?;
        }
    }
    Ok(())
}

/// Directory containing `path`, treating a bare filename as the current dir
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn fsync_dir(dir: &Path) -> std::io::Result<()> {
    let file = File::open(dir)?;
    file.sync_all()
}
