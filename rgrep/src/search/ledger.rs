//! Outstanding-work tracking.
//!
//! Every scan or walk task is registered in the ledger before it becomes
//! visible to any worker thread, and deregisters (via its guard's `Drop`)
//! only after all of its output has been sent. The completion watcher
//! blocks on `wait_idle`, so the count reaching zero is exactly the point
//! at which no task is running and none is still queued.

use std::sync::{Arc, Condvar, Mutex};

#[derive(Debug, Default)]
struct LedgerInner {
    outstanding: Mutex<usize>,
    idle: Condvar,
}

/// A counted tracker of outstanding tasks
#[derive(Debug, Clone, Default)]
pub struct TaskLedger {
    inner: Arc<LedgerInner>,
}

/// RAII registration of one task; dropping it marks the task finished
#[derive(Debug)]
pub struct TaskGuard {
    inner: Arc<LedgerInner>,
}

impl TaskLedger {
    /// Creates an idle ledger
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers one unit of work.
    ///
    /// Must be called before the corresponding task is enqueued or
    /// spawned; otherwise the watcher could observe a zero count while
    /// the task is still pending.
    pub fn register(&self) -> TaskGuard {
        let mut count = self.inner.outstanding.lock().unwrap();
        *count += 1;
        TaskGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Current number of registered, unfinished tasks
    pub fn outstanding(&self) -> usize {
        *self.inner.outstanding.lock().unwrap()
    }

    /// Blocks until every registered task has finished
    pub fn wait_idle(&self) {
        let mut count = self.inner.outstanding.lock().unwrap();
        while *count > 0 {
            count = self.inner.idle.wait(count).unwrap();
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        let mut count = self.inner.outstanding.lock().unwrap();
        *count -= 1;
        if *count == 0 {
            self.inner.idle.notify_all();
        }
    }
}
