//! Sync Events
//!
//! Leveled events emitted by bootstrap, the reconciler and the scheduler. Components
//! receive an [`EventSink`] explicitly instead of reaching for a global logger, so
//! tests can capture exactly what a pass did.

use parking_lot::Mutex;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Severity of a sync event
///
/// `tracing` has no level above error, so [`TracingSink`] writes `Fatal`
/// events at error level with `fatal = true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Error,
    /// The pass aborted and the scheduler is stopping
    Fatal,
}

/// Everything a pass can report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Replica root created during bootstrap
    ReplicaCreated(PathBuf),
    /// Source root missing during bootstrap
    SourceMissing(PathBuf),
    /// Ancestor directory created in the replica
    DirectoryCreated(PathBuf),
    /// File copied or overwritten in the replica
    FileCopied { from: PathBuf, to: PathBuf },
    /// Replica file removed because the source no longer has it
    FileDeleted(PathBuf),
    /// Empty replica directory removed
    DirectoryDeleted(PathBuf),
    /// A single entry failed while the pass kept going
    EntryFailed { path: PathBuf, message: String },
    PassStarted { pass: u64 },
    PassFinished {
        pass: u64,
        copied: usize,
        deleted: usize,
        failures: usize,
    },
    /// A pass aborted; the run ends with this error
    PassFailed { pass: u64, message: String },
    ShutdownRequested,
}

impl SyncEvent {
    pub fn level(&self) -> Level {
        match self {
            SyncEvent::SourceMissing(_) | SyncEvent::EntryFailed { .. } => Level::Error,
            SyncEvent::PassFailed { .. } => Level::Fatal,
            SyncEvent::PassStarted { .. } => Level::Debug,
            _ => Level::Info,
        }
    }

    /// Whether this event describes a mutation of the replica tree
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            SyncEvent::DirectoryCreated(_)
                | SyncEvent::FileCopied { .. }
                | SyncEvent::FileDeleted(_)
                | SyncEvent::DirectoryDeleted(_)
        )
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncEvent::ReplicaCreated(p) => write!(f, "Replica directory created: {}", p.display()),
            SyncEvent::SourceMissing(p) => {
                write!(f, "Source directory does not exist: {}", p.display())
            }
            SyncEvent::DirectoryCreated(p) => write!(f, "Directory created: {}", p.display()),
            SyncEvent::FileCopied { from, to } => {
                write!(f, "Copied/Updated: {} to {}", from.display(), to.display())
            }
            SyncEvent::FileDeleted(p) => write!(f, "Deleted: {}", p.display()),
            SyncEvent::DirectoryDeleted(p) => write!(f, "Directory deleted: {}", p.display()),
            SyncEvent::EntryFailed { path, message } => {
                write!(f, "Failed to sync {}: {}", path.display(), message)
            }
            SyncEvent::PassStarted { pass } => write!(f, "Sync pass {} started", pass),
            SyncEvent::PassFinished {
                pass,
                copied,
                deleted,
                failures,
            } => write!(
                f,
                "Sync pass {} finished: {} copied, {} deleted, {} failed",
                pass, copied, deleted, failures
            ),
            SyncEvent::PassFailed { pass, message } => {
                write!(f, "Sync pass {} failed: {}", pass, message)
            }
            SyncEvent::ShutdownRequested => write!(f, "Shutdown requested, stopping scheduler"),
        }
    }
}

/// Destination for sync events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &SyncEvent);
}

/// Forwards events to `tracing` at the event's level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &SyncEvent) {
        match event.level() {
            Level::Debug => debug!(target: "foldersync::sync", "{}", event),
            Level::Info => info!(target: "foldersync::sync", "{}", event),
            Level::Error => error!(target: "foldersync::sync", "{}", event),
            Level::Fatal => error!(target: "foldersync::sync", fatal = true, "{}", event),
        }
    }
}

/// Records every event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<SyncEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().clone()
    }

    /// Events that changed the replica tree
    pub fn mutations(&self) -> Vec<SyncEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.is_mutation())
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &SyncEvent) {
        self.events.lock().push(event.clone());
    }
}
