//! Concurrent, recursive line-search engine.
//!
//! The library walks one or more filesystem targets, fans file scans and
//! directory walks out across a bounded pool of worker threads, applies a
//! compiled pattern to every line, and multiplexes all results into a single
//! stream that the caller drains in arrival order.

pub mod config;
pub mod errors;
pub mod metrics;
pub mod results;
pub mod search;

pub use config::{CliOverrides, SearchConfig};
pub use errors::{SearchError, SearchResult};
pub use results::{CountRecord, ErrorRecord, MatchRecord, SearchEvent};
pub use search::{search, SearchStream};

/// Re-export common types for convenience
pub mod prelude {
    pub use crate::config::SearchConfig;
    pub use crate::errors::{SearchError, SearchResult};
    pub use crate::results::SearchEvent;
    pub use crate::search::{search, SearchStream};
}
