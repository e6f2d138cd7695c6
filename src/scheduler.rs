//! Scheduler
//!
//! Runs a reconcile pass immediately and then again every interval. Passes are
//! strictly sequential on the calling thread. The loop ends when a
//! [`ShutdownHandle`] is triggered, when an optional pass limit is reached, or
//! when a pass fails.

use crate::error::SyncError;
use crate::events::{EventSink, SyncEvent};
use crate::reconcile::PassReport;
use parking_lot::{Condvar, Mutex};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Cloneable shutdown signal shared between the scheduler and whoever stops it
#[derive(Clone, Default)]
pub struct ShutdownHandle {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown; wakes a scheduler that is sleeping between passes
    pub fn trigger(&self) {
        let (lock, condvar) = &*self.inner;
        *lock.lock() = true;
        condvar.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Sleep for `timeout` unless shutdown is requested first
    ///
    /// Returns true if shutdown was requested. A timeout too large to express
    /// as a deadline waits for shutdown alone.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, condvar) = &*self.inner;
        let deadline = Instant::now().checked_add(timeout);
        let mut triggered = lock.lock();
        while !*triggered {
            match deadline {
                Some(deadline) => {
                    if condvar.wait_until(&mut triggered, deadline).timed_out() {
                        break;
                    }
                }
                None => condvar.wait(&mut triggered),
            }
        }
        *triggered
    }
}

/// Why the scheduler stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Shutdown,
    PassLimit,
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub passes: u64,
    pub stop_reason: StopReason,
    pub last_report: Option<PassReport>,
}

/// Periodic driver for reconcile passes
pub struct Scheduler {
    source: PathBuf,
    replica: PathBuf,
    interval: Duration,
    max_passes: Option<u64>,
    shutdown: ShutdownHandle,
    sink: Arc<dyn EventSink>,
}

impl Scheduler {
    pub fn new(
        source: impl Into<PathBuf>,
        replica: impl Into<PathBuf>,
        interval: Duration,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
            interval,
            max_passes: None,
            shutdown: ShutdownHandle::new(),
            sink,
        }
    }

    /// Stop after `passes` passes instead of running until shutdown
    pub fn with_max_passes(mut self, passes: u64) -> Self {
        self.max_passes = Some(passes);
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownHandle) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Run passes until shutdown or the pass limit
    ///
    /// A failing pass ends the run with that error.
    pub fn run<R>(&self, mut reconcile: R) -> Result<RunSummary, SyncError>
    where
        R: FnMut(&Path, &Path) -> Result<PassReport, SyncError>,
    {
        info!(
            source = %self.source.display(),
            replica = %self.replica.display(),
            interval_secs = self.interval.as_secs(),
            "Scheduler started"
        );

        let mut passes = 0u64;
        let mut last_report = None;

        loop {
            if self.shutdown.is_triggered() {
                return Ok(self.stopped(passes, StopReason::Shutdown, last_report));
            }

            passes += 1;
            self.sink.emit(&SyncEvent::PassStarted { pass: passes });
            let report = match reconcile(&self.source, &self.replica) {
                Ok(report) => report,
                Err(e) => {
                    self.sink.emit(&SyncEvent::PassFailed {
                        pass: passes,
                        message: e.to_string(),
                    });
                    return Err(e);
                }
            };
            self.sink.emit(&SyncEvent::PassFinished {
                pass: passes,
                copied: report.files_copied,
                deleted: report.files_deleted + report.dirs_deleted,
                failures: report.failures.len(),
            });
            last_report = Some(report);

            if self.max_passes.is_some_and(|max| passes >= max) {
                return Ok(self.stopped(passes, StopReason::PassLimit, last_report));
            }

            if self.shutdown.wait_timeout(self.interval) {
                return Ok(self.stopped(passes, StopReason::Shutdown, last_report));
            }
        }
    }

    fn stopped(
        &self,
        passes: u64,
        stop_reason: StopReason,
        last_report: Option<PassReport>,
    ) -> RunSummary {
        if stop_reason == StopReason::Shutdown {
            self.sink.emit(&SyncEvent::ShutdownRequested);
        }
        info!(passes, ?stop_reason, "Scheduler stopped");
        RunSummary {
            passes,
            stop_reason,
            last_report,
        }
    }
}
