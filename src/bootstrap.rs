//! Startup checks run once before the scheduler takes over

use crate::error::SyncError;
use crate::events::{EventSink, SyncEvent};
use crate::tree::path::{canonicalize_root, ensure_disjoint, normalize_lexically};
use std::path::{Path, PathBuf};

/// Canonical source and replica roots, validated and ready to sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRoots {
    pub source: PathBuf,
    pub replica: PathBuf,
}

/// Validate the source, create the replica if needed, and resolve both roots
///
/// The source must be an existing directory. Source and replica must be distinct
/// and neither may contain the other; this is checked before the replica is
/// created so a bad configuration leaves no directory behind.
pub fn prepare(source: &Path, replica: &Path, sink: &dyn EventSink) -> Result<SyncRoots, SyncError> {
    if !source.is_dir() {
        sink.emit(&SyncEvent::SourceMissing(source.to_path_buf()));
        return Err(SyncError::SourceMissing(source.to_path_buf()));
    }
    let source = canonicalize_root(source)?;

    if replica.exists() && !replica.is_dir() {
        return Err(SyncError::InvalidConfig(format!(
            "Replica path exists and is not a directory: {}",
            replica.display()
        )));
    }

    let planned_replica = if replica.exists() {
        canonicalize_root(replica)?
    } else {
        absolute(replica)?
    };
    ensure_disjoint(&source, &planned_replica)?;

    if !replica.exists() {
        std::fs::create_dir_all(replica)
            .map_err(|e| SyncError::io("create replica directory", replica, e))?;
        sink.emit(&SyncEvent::ReplicaCreated(replica.to_path_buf()));
    }

    // Symlinked ancestors only show up once the replica exists.
    let replica = canonicalize_root(replica)?;
    ensure_disjoint(&source, &replica)?;

    Ok(SyncRoots { source, replica })
}

fn absolute(path: &Path) -> Result<PathBuf, SyncError> {
    if path.is_absolute() {
        return Ok(normalize_lexically(path));
    }
    let cwd = std::env::current_dir()
        .map_err(|e| SyncError::io("read current directory for", path, e))?;
    Ok(normalize_lexically(&cwd.join(path)))
}
