//! Change detection between a source file and its replica counterpart

use crate::error::SyncError;
use crate::fs::{EntryKind, FileSystem, Stat};
use crate::tree::FileEntry;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How to decide whether a replica file is stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Copy when the source is strictly newer than the replica
    #[default]
    Mtime,
    /// Copy when size or BLAKE3 digest differ; timestamps are ignored
    Checksum,
}

impl std::str::FromStr for CompareMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mtime" => Ok(CompareMode::Mtime),
            "checksum" => Ok(CompareMode::Checksum),
            other => Err(format!(
                "Invalid compare mode: {} (must be 'mtime' or 'checksum')",
                other
            )),
        }
    }
}

/// Decide whether `source` must be copied over `destination`
///
/// `existing` is the destination's current metadata. Anything at the destination
/// that is not a regular file always needs replacing.
pub fn needs_copy(
    fs: &dyn FileSystem,
    mode: CompareMode,
    source: &FileEntry,
    destination: &Path,
    existing: Option<&Stat>,
) -> Result<bool, SyncError> {
    let existing = match existing {
        Some(stat) if stat.kind == EntryKind::File => stat,
        _ => return Ok(true),
    };

    match mode {
        // Equal timestamps count as in sync.
        CompareMode::Mtime => Ok(source.modified > existing.modified),
        CompareMode::Checksum => {
            if source.size != existing.size {
                return Ok(true);
            }
            Ok(fs.checksum(&source.absolute)? != fs.checksum(destination)?)
        }
    }
}
