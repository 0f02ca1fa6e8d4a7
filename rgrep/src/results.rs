//! Result records produced by concurrent scan and walk tasks.
//!
//! Every unit of work reports through the same stream as a [`SearchEvent`]:
//! one record per matching (or, inverted, non-matching) line, one count per
//! file in count mode, or one error in place of the normal output for a
//! failed path. Records are owned values so they can cross thread
//! boundaries freely; the stream preserves arrival order, which is
//! line order within any single file and nondeterministic across files.

use std::fmt;
use std::path::PathBuf;

/// A single line selected by the search.
///
/// `line_number` is populated only when line-number output was requested;
/// `line` already carries the rendered content (the full line text, or the
/// joined matched substrings in only-matching mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// The file the line came from
    pub path: PathBuf,
    /// 1-based line number, when line-number output is enabled
    pub line_number: Option<u64>,
    /// Rendered line content
    pub line: String,
}

/// Per-file match count, emitted once per fully scanned file in count mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountRecord {
    /// The file that was scanned
    pub path: PathBuf,
    /// Number of lines selected
    pub matches: u64,
}

/// A recovered per-path failure, emitted in place of normal output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// The file or directory the failure applies to
    pub path: PathBuf,
    /// Human-readable cause
    pub message: String,
}

/// The union of everything a scan or walk task can report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    Match(MatchRecord),
    Count(CountRecord),
    Error(ErrorRecord),
}

impl SearchEvent {
    /// The path this event refers to
    pub fn path(&self) -> &std::path::Path {
        match self {
            SearchEvent::Match(m) => &m.path,
            SearchEvent::Count(c) => &c.path,
            SearchEvent::Error(e) => &e.path,
        }
    }
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line_number {
            Some(n) => write!(f, "{}:{}:{}", self.path.display(), n, self.line),
            None => write!(f, "{}:{}", self.path.display(), self.line),
        }
    }
}

impl fmt::Display for CountRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.matches)
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

impl fmt::Display for SearchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchEvent::Match(m) => m.fmt(f),
            SearchEvent::Count(c) => c.fmt(f),
            SearchEvent::Error(e) => e.fmt(f),
        }
    }
}
