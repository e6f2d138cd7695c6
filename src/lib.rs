//! Foldersync: One-Way Periodic Directory Mirroring
//!
//! Keeps a replica directory identical to a source directory. Each pass copies new
//! and updated files, deletes replica files the source no longer has, and prunes
//! directories left empty. A scheduler repeats the pass at a fixed interval.

pub mod bootstrap;
pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod events;
pub mod fs;
pub mod logging;
pub mod reconcile;
pub mod scheduler;
pub mod tree;

pub use error::SyncError;
pub use events::{EventSink, MemorySink, SyncEvent, TracingSink};
pub use reconcile::{PassReport, ReconcileOptions, Reconciler};
pub use scheduler::{Scheduler, ShutdownHandle};
