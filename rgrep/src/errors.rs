//! Error types for the search engine.
//!
//! Only configuration-time failures (an invalid pattern, a broken config
//! file) are surfaced as `Err` values: they abort the run before any
//! scanning starts. Everything that goes wrong on a specific path during a
//! run (stat, open, read, readdir) is reported as an
//! [`ErrorRecord`](crate::results::ErrorRecord) in the result stream so
//! that one bad file or subtree never takes down its siblings.

use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that abort a run before any scanning starts
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SearchError {
    pub fn invalid_pattern(msg: impl Into<String>) -> Self {
        Self::InvalidPattern(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
