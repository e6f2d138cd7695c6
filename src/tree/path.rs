//! Path utilities for matching entries across the source and replica trees
//!
//! Entries are joined on their path relative to the root they were found under.
//! Relative paths are derived by stripping whole components, never by slicing
//! strings, so separators and trailing slashes cannot shift the key.

use crate::error::SyncError;
use std::path::{Component, Path, PathBuf};

/// Canonicalize a root directory
///
/// Uses `dunce` so Windows roots do not pick up the `\\?\` prefix.
pub fn canonicalize_root(path: &Path) -> Result<PathBuf, SyncError> {
    dunce::canonicalize(path).map_err(|e| SyncError::io("canonicalize", path, e))
}

/// Express `path` relative to `root`
pub fn relativize(root: &Path, path: &Path) -> Result<PathBuf, SyncError> {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .map_err(|_| {
            SyncError::InvalidPath(format!(
                "{} is not under {}",
                path.display(),
                root.display()
            ))
        })
}

/// Ensure two roots are distinct and neither contains the other
///
/// Both paths are expected to be canonical already.
pub fn ensure_disjoint(source: &Path, replica: &Path) -> Result<(), SyncError> {
    if source == replica {
        return Err(SyncError::InvalidConfig(format!(
            "Source and replica must be different directories: {}",
            source.display()
        )));
    }
    if replica.starts_with(source) {
        return Err(SyncError::InvalidConfig(format!(
            "Replica {} is inside source {}",
            replica.display(),
            source.display()
        )));
    }
    if source.starts_with(replica) {
        return Err(SyncError::InvalidConfig(format!(
            "Source {} is inside replica {}",
            source.display(),
            replica.display()
        )));
    }
    Ok(())
}

/// Lexically normalize a path that may not exist yet
///
/// Drops `.` components and resolves `..` against preceding normal components.
/// Used for the replica root before it is created, where canonicalization would fail.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
