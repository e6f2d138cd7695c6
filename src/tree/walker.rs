//! Filesystem walker for listing a sync root

use crate::error::SyncError;
use crate::tree::path::relativize;
use std::cmp::Reverse;
use std::path::PathBuf;
use std::time::SystemTime;
use walkdir::WalkDir;

/// A regular file found under a root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the root it was listed from
    pub relative: PathBuf,
    /// Absolute path on disk
    pub absolute: PathBuf,
    pub modified: SystemTime,
    pub size: u64,
}

/// A directory found under a root (the root itself is never listed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub relative: PathBuf,
    pub absolute: PathBuf,
    /// Depth below the root, starting at 1 for direct children
    pub depth: usize,
}

/// Filesystem entry types
#[derive(Debug, Clone)]
pub enum Entry {
    File(FileEntry),
    Directory(DirEntry),
}

/// Filesystem walker
///
/// Symbolic links are never followed and never listed; only regular files and
/// directories take part in a sync.
pub struct Walker {
    root: PathBuf,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Walk the filesystem and collect all entries, children before their parents
    pub fn walk(&self) -> Result<Vec<Entry>, SyncError> {
        let mut entries = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .min_depth(1)
            .contents_first(true);

        for entry in walker {
            let entry = entry?;
            let file_type = entry.file_type();
            let absolute = entry.path().to_path_buf();
            let relative = relativize(&self.root, &absolute)?;

            if file_type.is_file() {
                let metadata = entry.metadata()?;
                let modified = metadata
                    .modified()
                    .map_err(|e| SyncError::io("read modification time of", &absolute, e))?;
                entries.push(Entry::File(FileEntry {
                    relative,
                    absolute,
                    modified,
                    size: metadata.len(),
                }));
            } else if file_type.is_dir() {
                entries.push(Entry::Directory(DirEntry {
                    relative,
                    absolute,
                    depth: entry.depth(),
                }));
            }
        }

        Ok(entries)
    }

    /// All regular files, sorted by relative path
    pub fn files(&self) -> Result<Vec<FileEntry>, SyncError> {
        let mut files: Vec<FileEntry> = self
            .walk()?
            .into_iter()
            .filter_map(|e| match e {
                Entry::File(f) => Some(f),
                Entry::Directory(_) => None,
            })
            .collect();
        files.sort_by(|a, b| a.relative.cmp(&b.relative));
        Ok(files)
    }

    /// All directories, deepest first
    ///
    /// Ties at equal depth are ordered by relative path for determinism. Every
    /// directory appears before any of its ancestors.
    pub fn directories(&self) -> Result<Vec<DirEntry>, SyncError> {
        let mut dirs: Vec<DirEntry> = self
            .walk()?
            .into_iter()
            .filter_map(|e| match e {
                Entry::Directory(d) => Some(d),
                Entry::File(_) => None,
            })
            .collect();
        dirs.sort_by(|a, b| {
            Reverse(a.depth)
                .cmp(&Reverse(b.depth))
                .then_with(|| a.relative.cmp(&b.relative))
        });
        Ok(dirs)
    }
}
