//! Pattern compilation and per-line matching.

use regex::{Regex, RegexBuilder};

use crate::errors::{SearchError, SearchResult};

/// A compiled search pattern.
///
/// Built once per run and shared across all worker threads; `Regex` is
/// internally synchronized, so the matcher is freely usable from many
/// tasks at once.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    regex: Regex,
}

impl PatternMatcher {
    /// Compiles a pattern, applying case-insensitivity and whole-word
    /// wrapping before compilation.
    ///
    /// Whole-word mode wraps the pattern in a non-capturing group between
    /// word boundaries so that alternations keep their meaning:
    /// `foo|bar` becomes `\b(?:foo|bar)\b`, not `\bfoo|bar\b`.
    pub fn new(pattern: &str, case_insensitive: bool, whole_word: bool) -> SearchResult<Self> {
        let source = if whole_word {
            format!(r"\b(?:{pattern})\b")
        } else {
            pattern.to_string()
        };

        let regex = RegexBuilder::new(&source)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| SearchError::invalid_pattern(e.to_string()))?;

        Ok(Self { regex })
    }

    /// Finds all non-overlapping matches in a line.
    ///
    /// Zero-width matches (an empty pattern, or bare word boundaries) are
    /// reported once per position; `find_iter` advances past them, so no
    /// position is ever reported twice and the scan always terminates.
    pub fn find_matches(&self, line: &str) -> Vec<(usize, usize)> {
        self.regex
            .find_iter(line)
            .map(|m| (m.start(), m.end()))
            .collect()
    }

    /// Tests whether the line contains at least one match
    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}
