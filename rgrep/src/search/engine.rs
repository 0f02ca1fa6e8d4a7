//! The concurrency coordinator.
//!
//! `search` wires together a fixed pool of worker threads pulling from a
//! shared work queue, a bounded result channel, a dispatcher that
//! classifies the top-level targets, and a completion watcher. Tasks are
//! registered in the [`TaskLedger`](super::ledger::TaskLedger) before they
//! are enqueued, so the watcher can only observe an idle ledger once every
//! scan and walk (including ones enqueued mid-walk) has finished. The
//! watcher then raises the shutdown flag; workers exit, the last result
//! sender drops, and the stream closes exactly once.
//!
//! Producers block when the bounded result channel is full, so output is
//! never dropped under load; the consumer draining the stream provides the
//! backpressure.

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

use super::classify::{classify, PathKind};
use super::ledger::{TaskGuard, TaskLedger};
use super::matcher::PatternMatcher;
use super::scanner::scan_file;
use super::walker::walk_dir;
use crate::config::SearchConfig;
use crate::errors::SearchResult;
use crate::metrics::SearchMetrics;
use crate::results::{ErrorRecord, SearchEvent};

const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// A unit of work for the pool
enum Task {
    Scan(PathBuf),
    Walk(PathBuf),
}

/// A task paired with its ledger registration; the guard drops only
/// after the task ran (or was discarded), never before.
struct QueuedTask {
    task: Task,
    _guard: TaskGuard,
}

/// Shared state each worker carries: the immutable pattern and options,
/// the ledger, and the two channel endpoints.
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub(crate) config: Arc<SearchConfig>,
    matcher: Arc<PatternMatcher>,
    ledger: TaskLedger,
    tasks: Sender<QueuedTask>,
    results: Sender<SearchEvent>,
}

impl WorkerContext {
    /// Sends one event into the result stream.
    ///
    /// A send failure means the consumer dropped the stream; the event is
    /// discarded and the producing task winds down on its own.
    pub(crate) fn emit(&self, event: SearchEvent) {
        let _ = self.results.send(event);
    }

    /// Registers and enqueues a file scan
    pub(crate) fn enqueue_scan(&self, path: PathBuf) {
        self.enqueue(Task::Scan(path));
    }

    /// Registers and enqueues a directory walk
    pub(crate) fn enqueue_walk(&self, path: PathBuf) {
        self.enqueue(Task::Walk(path));
    }

    fn enqueue(&self, task: Task) {
        // Register before the task becomes visible to any worker; the
        // guard travels with the task through the queue.
        let guard = self.ledger.register();
        let _ = self.tasks.send(QueuedTask {
            task,
            _guard: guard,
        });
    }
}

/// Starts a concurrent search and returns the stream of results.
///
/// Fails only on configuration problems (an invalid pattern); every
/// error encountered after this point is scoped to one path and reported
/// through the stream. Dropping the returned stream early cancels the
/// run cleanly.
pub fn search(config: &SearchConfig) -> SearchResult<SearchStream> {
    let matcher = PatternMatcher::new(
        &config.pattern,
        config.case_insensitive,
        config.whole_word,
    )?;

    let worker_count = config.concurrency.get();
    info!(
        pattern = %config.pattern,
        workers = worker_count,
        "starting search"
    );

    // Result buffer depth matches the worker count, like the task bound
    let (result_tx, result_rx) = bounded(worker_count);
    let (task_tx, task_rx) = unbounded();
    let ledger = TaskLedger::new();
    let shutdown = Arc::new(AtomicBool::new(false));
    let metrics = SearchMetrics::new();

    let ctx = WorkerContext {
        config: Arc::new(config.clone()),
        matcher: Arc::new(matcher),
        ledger: ledger.clone(),
        tasks: task_tx,
        results: result_tx,
    };

    let mut handles = Vec::with_capacity(worker_count + 2);
    for _ in 0..worker_count {
        let ctx = ctx.clone();
        let task_rx = task_rx.clone();
        let shutdown = Arc::clone(&shutdown);
        let metrics = metrics.clone();
        handles.push(thread::spawn(move || {
            worker_loop(ctx, task_rx, shutdown, metrics)
        }));
    }
    drop(task_rx);

    // The dispatcher holds its own registration for the whole pass, so
    // the ledger cannot reach zero while later targets are still pending.
    let dispatch_guard = ledger.register();
    let targets = if config.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        config.paths.clone()
    };
    {
        let ctx = ctx.clone();
        handles.push(thread::spawn(move || {
            dispatch_targets(ctx, targets, dispatch_guard)
        }));
    }

    // The engine's own channel handles must not keep the stream open
    drop(ctx);

    {
        let ledger = ledger.clone();
        let shutdown = Arc::clone(&shutdown);
        let metrics = metrics.clone();
        handles.push(thread::spawn(move || {
            ledger.wait_idle();
            metrics.log_stats();
            // Single close: workers observe the flag, exit, and drop the
            // last result senders.
            shutdown.store(true, Ordering::SeqCst);
        }));
    }

    Ok(SearchStream {
        events: result_rx,
        shutdown,
        handles,
        metrics,
    })
}

/// Classifies each top-level target and enqueues the matching task kind.
fn dispatch_targets(ctx: WorkerContext, targets: Vec<PathBuf>, guard: TaskGuard) {
    for target in targets {
        match classify(&target) {
            Ok(PathKind::Directory) => ctx.enqueue_walk(target),
            Ok(PathKind::RegularFile) => ctx.enqueue_scan(target),
            Ok(PathKind::Other) => {
                ctx.emit(SearchEvent::Error(ErrorRecord {
                    path: target,
                    message: "not a regular file or directory".to_string(),
                }));
            }
            Err(e) => {
                ctx.emit(SearchEvent::Error(ErrorRecord {
                    path: target,
                    message: e.to_string(),
                }));
            }
        }
    }
    drop(ctx);
    drop(guard);
}

fn worker_loop(
    ctx: WorkerContext,
    tasks: Receiver<QueuedTask>,
    shutdown: Arc<AtomicBool>,
    metrics: SearchMetrics,
) {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            debug!("worker shutting down");
            break;
        }
        let queued = match tasks.recv_timeout(SHUTDOWN_POLL_INTERVAL) {
            Ok(queued) => queued,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        match queued.task {
            Task::Scan(path) => {
                scan_file(&path, &ctx.matcher, &ctx.config, &ctx.results);
                metrics.record_file_scanned();
            }
            Task::Walk(path) => {
                walk_dir(&ctx, &path);
                metrics.record_dir_walked();
            }
        }
        // queued (and its ledger guard) drops here, after every record
        // for the task was sent
    }
}

/// The consumable result stream of a running search.
///
/// Iteration blocks until the next event arrives and ends only when the
/// stream has been closed by the completion watcher, so draining it to
/// the end observes every in-flight task's output in arrival order.
pub struct SearchStream {
    events: Receiver<SearchEvent>,
    shutdown: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
    metrics: SearchMetrics,
}

impl SearchStream {
    /// Run counters for this search
    pub fn metrics(&self) -> &SearchMetrics {
        &self.metrics
    }
}

impl Iterator for SearchStream {
    type Item = SearchEvent;

    fn next(&mut self) -> Option<SearchEvent> {
        match self.events.recv() {
            Ok(event) => {
                self.metrics.record_event_delivered();
                Some(event)
            }
            Err(_) => None,
        }
    }
}

impl Drop for SearchStream {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Unblock any producer stuck on a full result buffer, then wait
        // for the pool to wind down.
        while self.events.recv().is_ok() {}
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{CountRecord, MatchRecord};
    use std::fs;
    use std::num::NonZeroUsize;
    use tempfile::tempdir;

    fn run_to_vec(config: &SearchConfig) -> Vec<SearchEvent> {
        search(config).unwrap().collect()
    }

    #[test]
    fn test_single_file_target() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("a.txt");
        fs::write(&file_path, "foo\nbar\nfoobar\n").unwrap();

        let config = SearchConfig::new("foo", vec![file_path.clone()]);
        let mut events = run_to_vec(&config);
        events.sort_by(|a, b| a.to_string().cmp(&b.to_string()));

        assert_eq!(
            events,
            vec![
                SearchEvent::Match(MatchRecord {
                    path: file_path.clone(),
                    line_number: None,
                    line: "foo".to_string(),
                }),
                SearchEvent::Match(MatchRecord {
                    path: file_path.clone(),
                    line_number: None,
                    line: "foobar".to_string(),
                }),
            ]
        );
    }

    #[test]
    fn test_recursive_directory_target() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "foo\n").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.txt"), "foo\n").unwrap();

        let config =
            SearchConfig::new("foo", vec![dir.path().to_path_buf()]).with_recursive(true);
        let events = run_to_vec(&config);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_non_recursive_skips_subdirectories() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "foo\nbar\nfoobar\n").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.txt"), "foo\n").unwrap();

        let config = SearchConfig::new("foo", vec![dir.path().to_path_buf()]);
        let events = run_to_vec(&config);

        // Only a.txt is scanned; sub/b.txt is never visited
        assert_eq!(events.len(), 2);
        for event in &events {
            assert_eq!(event.path(), dir.path().join("a.txt"));
        }
    }

    #[test]
    fn test_missing_target_reports_one_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("no-such-path");
        fs::write(dir.path().join("a.txt"), "foo\n").unwrap();

        let config = SearchConfig::new(
            "foo",
            vec![missing.clone(), dir.path().join("a.txt")],
        );
        let events = run_to_vec(&config);

        let errors: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, SearchEvent::Error(_)))
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path(), missing.as_path());

        // The healthy sibling still produced its match
        assert!(events
            .iter()
            .any(|e| matches!(e, SearchEvent::Match(_))));
    }

    #[test]
    fn test_count_mode_across_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "foo\nbar\nfoobar\n").unwrap();
        fs::write(dir.path().join("b.txt"), "nothing here\n").unwrap();

        let config = SearchConfig::new("foo", vec![dir.path().to_path_buf()])
            .with_count_only(true);
        let mut events = run_to_vec(&config);
        events.sort_by(|a, b| a.path().cmp(b.path()));

        assert_eq!(
            events,
            vec![
                SearchEvent::Count(CountRecord {
                    path: dir.path().join("a.txt"),
                    matches: 2,
                }),
                SearchEvent::Count(CountRecord {
                    path: dir.path().join("b.txt"),
                    matches: 0,
                }),
            ]
        );
    }

    #[test]
    fn test_invalid_pattern_is_fatal() {
        let config = SearchConfig::new("(unclosed", vec![PathBuf::from(".")]);
        assert!(search(&config).is_err());
    }

    #[test]
    fn test_single_worker_still_completes_recursive_walks() {
        // One worker must not deadlock on tasks enqueued mid-walk
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        fs::write(dir.path().join("a/b/c/deep.txt"), "foo\n").unwrap();
        fs::write(dir.path().join("top.txt"), "foo\n").unwrap();

        let config = SearchConfig::new("foo", vec![dir.path().to_path_buf()])
            .with_recursive(true)
            .with_concurrency(NonZeroUsize::new(1).unwrap());
        let events = run_to_vec(&config);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_dropping_stream_early_does_not_hang() {
        let dir = tempdir().unwrap();
        for i in 0..50 {
            let content = "foo\n".repeat(100);
            fs::write(dir.path().join(format!("f{i}.txt")), content).unwrap();
        }

        let config = SearchConfig::new("foo", vec![dir.path().to_path_buf()])
            .with_concurrency(NonZeroUsize::new(2).unwrap());
        let mut stream = search(&config).unwrap();
        // Take a few events, then abandon the stream mid-run
        let _ = stream.next();
        let _ = stream.next();
        drop(stream);
    }

    #[test]
    fn test_metrics_track_scans() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "foo\n").unwrap();
        fs::write(dir.path().join("b.txt"), "foo\n").unwrap();

        let config = SearchConfig::new("foo", vec![dir.path().to_path_buf()]);
        let mut stream = search(&config).unwrap();
        let mut delivered = 0;
        for _ in stream.by_ref() {
            delivered += 1;
        }
        assert_eq!(delivered, 2);
        assert_eq!(stream.metrics().files_scanned(), 2);
        assert_eq!(stream.metrics().dirs_walked(), 1);
        assert_eq!(stream.metrics().events_delivered(), 2);
    }
}
