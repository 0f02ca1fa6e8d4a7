//! Run counters shared by the worker threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Tracks how much work a run performed.
///
/// All counters are atomics updated with relaxed ordering; they are
/// informational and never used for synchronization.
#[derive(Debug, Clone, Default)]
pub struct SearchMetrics {
    files_scanned: Arc<AtomicU64>,
    dirs_walked: Arc<AtomicU64>,
    events_delivered: Arc<AtomicU64>,
}

impl SearchMetrics {
    /// Creates a new metrics instance with all counters at zero
    pub fn new() -> Self {
        Default::default()
    }

    /// Records one completed file scan
    pub fn record_file_scanned(&self) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one completed directory walk
    pub fn record_dir_walked(&self) {
        self.dirs_walked.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one event delivered to the consumer
    pub fn record_event_delivered(&self) {
        self.events_delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of files fully or partially scanned
    pub fn files_scanned(&self) -> u64 {
        self.files_scanned.load(Ordering::Relaxed)
    }

    /// Number of directories enumerated
    pub fn dirs_walked(&self) -> u64 {
        self.dirs_walked.load(Ordering::Relaxed)
    }

    /// Number of events the consumer has taken from the stream
    pub fn events_delivered(&self) -> u64 {
        self.events_delivered.load(Ordering::Relaxed)
    }

    /// Logs the run totals
    pub fn log_stats(&self) {
        info!(
            files = self.files_scanned(),
            dirs = self.dirs_walked(),
            events = self.events_delivered(),
            "search complete"
        );
    }
}
