//! The concurrent search engine.
//!
//! One task per file scan and one task per directory walk, executed on a
//! fixed pool of worker threads that pull from a shared work queue.
//! Recursive walks enqueue further tasks mid-walk; a counted ledger tracks
//! every outstanding task so the result stream can be closed exactly once,
//! after the last task finishes. Tasks share only immutable state (the
//! compiled pattern and the configuration) plus the ledger and the result
//! channel, so no other locking is needed.

pub mod classify;
pub mod engine;
pub mod ledger;
pub mod matcher;
pub mod scanner;
pub mod walker;

pub use classify::{classify, PathKind};
pub use engine::{search, SearchStream};
pub use ledger::TaskLedger;
pub use matcher::PatternMatcher;
