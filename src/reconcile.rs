//! Reconciler
//!
//! One synchronization pass over a source and replica root. A pass runs three
//! phases in order:
//!
//! 1. Propagate: copy every source file that is missing or stale in the replica,
//!    creating ancestor directories as needed.
//! 2. Prune files: delete replica files that have no regular file at the same
//!    relative path in the source.
//! 3. Prune directories: delete replica directories left with no children,
//!    deepest first so emptied ancestor chains collapse in the same pass.
//!
//! The source is only ever read. Every phase lists the trees afresh.

use crate::compare::{self, CompareMode};
use crate::error::SyncError;
use crate::events::{EventSink, SyncEvent};
use crate::fs::{EntryKind, FileSystem, LocalFs};
use crate::tree::FileEntry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument};

/// What to do when a single entry fails mid-pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Abort the pass with the first error
    #[default]
    Fail,
    /// Record the failure, log it, and carry on with the next entry
    Continue,
}

impl std::str::FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail" => Ok(ErrorPolicy::Fail),
            "continue" => Ok(ErrorPolicy::Continue),
            other => Err(format!(
                "Invalid error policy: {} (must be 'fail' or 'continue')",
                other
            )),
        }
    }
}

/// Reconciler options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub compare: CompareMode,
    pub on_error: ErrorPolicy,
}

/// An entry that failed while the pass continued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub dirs_created: usize,
    pub files_copied: usize,
    pub files_deleted: usize,
    pub dirs_deleted: usize,
    pub failures: Vec<EntryFailure>,
}

impl PassReport {
    /// Number of changes made to the replica
    pub fn mutations(&self) -> usize {
        self.dirs_created + self.files_copied + self.files_deleted + self.dirs_deleted
    }

    /// True when the pass found the replica already in sync
    pub fn is_noop(&self) -> bool {
        self.mutations() == 0 && self.failures.is_empty()
    }
}

/// Runs synchronization passes
pub struct Reconciler<F: FileSystem = LocalFs> {
    fs: F,
    sink: Arc<dyn EventSink>,
    options: ReconcileOptions,
}

impl Reconciler<LocalFs> {
    /// Reconciler over the local disk
    pub fn local(sink: Arc<dyn EventSink>, options: ReconcileOptions) -> Self {
        Self::new(LocalFs, sink, options)
    }
}

impl<F: FileSystem> Reconciler<F> {
    pub fn new(fs: F, sink: Arc<dyn EventSink>, options: ReconcileOptions) -> Self {
        Self { fs, sink, options }
    }

    /// Perform one full pass making `replica` mirror `source`
    #[instrument(skip_all, fields(source = %source.display(), replica = %replica.display()))]
    pub fn reconcile(&self, source: &Path, replica: &Path) -> Result<PassReport, SyncError> {
        // A vanished source must never be read as "delete everything".
        match self.fs.stat(source)? {
            Some(stat) if stat.kind == EntryKind::Directory => {}
            _ => return Err(SyncError::SourceMissing(source.to_path_buf())),
        }

        let mut report = PassReport::default();
        self.propagate(source, replica, &mut report)?;
        self.prune_files(source, replica, &mut report)?;
        self.prune_directories(replica, &mut report)?;

        debug!(
            copied = report.files_copied,
            files_deleted = report.files_deleted,
            dirs_created = report.dirs_created,
            dirs_deleted = report.dirs_deleted,
            failures = report.failures.len(),
            "Reconcile pass complete"
        );
        Ok(report)
    }

    fn propagate(
        &self,
        source: &Path,
        replica: &Path,
        report: &mut PassReport,
    ) -> Result<(), SyncError> {
        for file in self.fs.list_files(source)? {
            let destination = replica.join(&file.relative);
            let outcome = self.propagate_file(replica, &file, &destination, report);
            self.settle(outcome, &destination, report)?;
        }
        Ok(())
    }

    fn propagate_file(
        &self,
        replica: &Path,
        file: &FileEntry,
        destination: &Path,
        report: &mut PassReport,
    ) -> Result<(), SyncError> {
        if let Some(parent) = file.relative.parent() {
            self.ensure_directories(replica, parent, report)?;
        }

        let mut existing = self.fs.stat(destination)?;
        match existing.map(|s| s.kind) {
            Some(EntryKind::Directory) => {
                self.fs.remove_dir_all(destination)?;
                report.dirs_deleted += 1;
                self.sink
                    .emit(&SyncEvent::DirectoryDeleted(destination.to_path_buf()));
                existing = None;
            }
            Some(EntryKind::Other) => {
                self.fs.remove_file(destination)?;
                report.files_deleted += 1;
                self.sink.emit(&SyncEvent::FileDeleted(destination.to_path_buf()));
                existing = None;
            }
            Some(EntryKind::File) | None => {}
        }

        if compare::needs_copy(
            &self.fs,
            self.options.compare,
            file,
            destination,
            existing.as_ref(),
        )? {
            self.fs.copy_file(&file.absolute, destination, file.modified)?;
            report.files_copied += 1;
            self.sink.emit(&SyncEvent::FileCopied {
                from: file.absolute.clone(),
                to: destination.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Create every missing directory of `relative_dir` under `replica`, top down
    fn ensure_directories(
        &self,
        replica: &Path,
        relative_dir: &Path,
        report: &mut PassReport,
    ) -> Result<(), SyncError> {
        let mut current = replica.to_path_buf();
        for component in relative_dir.components() {
            current.push(component);
            match self.fs.stat(&current)?.map(|s| s.kind) {
                Some(EntryKind::Directory) => continue,
                // The source has a directory here now; the stale file goes.
                Some(EntryKind::File) | Some(EntryKind::Other) => {
                    self.fs.remove_file(&current)?;
                    report.files_deleted += 1;
                    self.sink.emit(&SyncEvent::FileDeleted(current.clone()));
                }
                None => {}
            }
            self.fs.create_dir(&current)?;
            report.dirs_created += 1;
            self.sink.emit(&SyncEvent::DirectoryCreated(current.clone()));
        }
        Ok(())
    }

    fn prune_files(
        &self,
        source: &Path,
        replica: &Path,
        report: &mut PassReport,
    ) -> Result<(), SyncError> {
        for file in self.fs.list_files(replica)? {
            let outcome = self.prune_file(source, &file, report);
            self.settle(outcome, &file.absolute, report)?;
        }
        Ok(())
    }

    fn prune_file(
        &self,
        source: &Path,
        file: &FileEntry,
        report: &mut PassReport,
    ) -> Result<(), SyncError> {
        let counterpart = source.join(&file.relative);
        let has_source_file = matches!(
            self.fs.stat(&counterpart)?,
            Some(stat) if stat.kind == EntryKind::File
        );
        if !has_source_file {
            self.fs.remove_file(&file.absolute)?;
            report.files_deleted += 1;
            self.sink.emit(&SyncEvent::FileDeleted(file.absolute.clone()));
        }
        Ok(())
    }

    fn prune_directories(&self, replica: &Path, report: &mut PassReport) -> Result<(), SyncError> {
        // Deepest first: a parent is checked only after all its children were.
        for dir in self.fs.list_directories(replica)? {
            let outcome = self.prune_directory(&dir.absolute, report);
            self.settle(outcome, &dir.absolute, report)?;
        }
        Ok(())
    }

    fn prune_directory(&self, dir: &Path, report: &mut PassReport) -> Result<(), SyncError> {
        if self.fs.is_empty_dir(dir)? {
            self.fs.remove_empty_dir(dir)?;
            report.dirs_deleted += 1;
            self.sink.emit(&SyncEvent::DirectoryDeleted(dir.to_path_buf()));
        }
        Ok(())
    }

    /// Apply the error policy to the outcome of one entry
    fn settle(
        &self,
        outcome: Result<(), SyncError>,
        path: &Path,
        report: &mut PassReport,
    ) -> Result<(), SyncError> {
        match (outcome, self.options.on_error) {
            (Ok(()), _) => Ok(()),
            (Err(e), ErrorPolicy::Fail) => Err(e),
            (Err(e), ErrorPolicy::Continue) => {
                let failure = EntryFailure {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                };
                self.sink.emit(&SyncEvent::EntryFailed {
                    path: failure.path.clone(),
                    message: failure.message.clone(),
                });
                report.failures.push(failure);
                Ok(())
            }
        }
    }
}
