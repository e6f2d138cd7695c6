//! Filesystem abstraction consumed by the reconciler

use crate::error::SyncError;
use crate::tree::{DirEntry, FileEntry, Walker};
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Kind of an entry found at a path, without following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

/// Metadata the reconciler compares across trees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub kind: EntryKind,
    pub modified: SystemTime,
    pub size: u64,
}

/// Operations a sync pass needs from the filesystem
pub trait FileSystem {
    /// Every regular file under `root`, recursively
    fn list_files(&self, root: &Path) -> Result<Vec<FileEntry>, SyncError>;

    /// Every directory under `root`, deepest first
    fn list_directories(&self, root: &Path) -> Result<Vec<DirEntry>, SyncError>;

    /// Metadata for `path`, or `None` if nothing exists there
    fn stat(&self, path: &Path) -> Result<Option<Stat>, SyncError>;

    /// Create a single directory; the parent must exist
    fn create_dir(&self, path: &Path) -> Result<(), SyncError>;

    /// Copy file content, overwriting `to`, then stamp `to` with `modified`
    fn copy_file(&self, from: &Path, to: &Path, modified: SystemTime) -> Result<(), SyncError>;

    /// Delete a single file or symlink
    fn remove_file(&self, path: &Path) -> Result<(), SyncError>;

    /// Remove a directory that must already be empty
    fn remove_empty_dir(&self, path: &Path) -> Result<(), SyncError>;

    /// Remove a directory and everything below it
    fn remove_dir_all(&self, path: &Path) -> Result<(), SyncError>;

    /// Whether `path` has no direct children
    fn is_empty_dir(&self, path: &Path) -> Result<bool, SyncError>;

    /// BLAKE3 digest of the file content
    fn checksum(&self, path: &Path) -> Result<blake3::Hash, SyncError>;
}

/// The local disk
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn list_files(&self, root: &Path) -> Result<Vec<FileEntry>, SyncError> {
        Walker::new(root).files()
    }

    fn list_directories(&self, root: &Path) -> Result<Vec<DirEntry>, SyncError> {
        Walker::new(root).directories()
    }

    fn stat(&self, path: &Path) -> Result<Option<Stat>, SyncError> {
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SyncError::io("stat", path, e)),
        };

        let file_type = metadata.file_type();
        let kind = if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        };
        let modified = metadata
            .modified()
            .map_err(|e| SyncError::io("read modification time of", path, e))?;

        Ok(Some(Stat {
            kind,
            modified,
            size: metadata.len(),
        }))
    }

    fn create_dir(&self, path: &Path) -> Result<(), SyncError> {
        match fs::create_dir(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
            Err(e) => Err(SyncError::io("create directory", path, e)),
        }
    }

    fn copy_file(&self, from: &Path, to: &Path, modified: SystemTime) -> Result<(), SyncError> {
        // fs::copy carries permission bits over, so an earlier copy of a read-only
        // source is itself read-only and must be made writable before overwriting.
        if let Ok(metadata) = fs::symlink_metadata(to) {
            let mut permissions = metadata.permissions();
            if metadata.is_file() && permissions.readonly() {
                permissions.set_readonly(false);
                fs::set_permissions(to, permissions)
                    .map_err(|e| SyncError::io("make writable", to, e))?;
            }
        }

        fs::copy(from, to).map_err(|e| SyncError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source: e,
        })?;

        // Unix can still stamp times on a read-only copy through a read handle.
        let file = fs::OpenOptions::new()
            .write(true)
            .open(to)
            .or_else(|_| fs::File::open(to))
            .map_err(|e| SyncError::io("open", to, e))?;
        file.set_modified(modified)
            .map_err(|e| SyncError::io("set modification time of", to, e))
    }

    fn remove_file(&self, path: &Path) -> Result<(), SyncError> {
        fs::remove_file(path).map_err(|e| SyncError::io("delete file", path, e))
    }

    fn remove_empty_dir(&self, path: &Path) -> Result<(), SyncError> {
        fs::remove_dir(path).map_err(|e| SyncError::io("delete directory", path, e))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<(), SyncError> {
        fs::remove_dir_all(path).map_err(|e| SyncError::io("delete directory tree", path, e))
    }

    fn is_empty_dir(&self, path: &Path) -> Result<bool, SyncError> {
        let mut entries = fs::read_dir(path).map_err(|e| SyncError::io("read directory", path, e))?;
        Ok(entries.next().is_none())
    }

    fn checksum(&self, path: &Path) -> Result<blake3::Hash, SyncError> {
        let mut file = fs::File::open(path).map_err(|e| SyncError::io("open", path, e))?;
        let mut hasher = blake3::Hasher::new();
        io::copy(&mut file, &mut hasher).map_err(|e| SyncError::io("read", path, e))?;
        Ok(hasher.finalize())
    }
}
