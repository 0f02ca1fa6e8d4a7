//! Search configuration.
//!
//! `SearchConfig` is built once, before any scanning starts, and is never
//! mutated afterwards; all concurrent tasks share it read-only through an
//! `Arc`, so no synchronization is needed around it.
//!
//! Flag defaults can be loaded from YAML config files, in order of
//! precedence:
//! 1. A custom file passed via `--config`
//! 2. A local `.rgrep.yaml` in the current directory
//! 3. A global `$CONFIG_DIR/rgrep/config.yaml`
//!
//! CLI arguments always win over config-file values (`merge_with_cli`).
//! The pattern and the target paths only ever come from the CLI.

use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};

use crate::errors::{SearchError, SearchResult};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Configuration for a single search run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// The pattern to search for (regex syntax)
    #[serde(skip)]
    pub pattern: String,

    /// Files and directories to search; defaults to the current directory
    #[serde(skip)]
    pub paths: Vec<PathBuf>,

    /// Ignore case when matching
    #[serde(default)]
    pub case_insensitive: bool,

    /// Select lines with no match instead of lines with at least one
    #[serde(default)]
    pub invert_match: bool,

    /// Prefix each output line with its 1-based line number
    #[serde(default)]
    pub line_numbers: bool,

    /// Output only the matched substrings instead of the whole line
    #[serde(default)]
    pub only_matching: bool,

    /// Output one match count per file instead of per-line output
    #[serde(default)]
    pub count_only: bool,

    /// Require matches to fall on word boundaries
    #[serde(default)]
    pub whole_word: bool,

    /// Descend into subdirectories
    #[serde(default)]
    pub recursive: bool,

    /// Number of worker threads; also sizes the result buffer
    #[serde(default = "default_concurrency")]
    pub concurrency: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_concurrency() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap()
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// CLI values that must stay distinguishable from their defaults.
///
/// Once a parsed `-j 8` is stored in a `SearchConfig` it is
/// indistinguishable from the built-in default on an 8-core machine.
/// These stay `Option` through the merge so an explicitly passed value
/// beats a config file even when it happens to equal the default.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub concurrency: Option<NonZeroUsize>,
    pub log_level: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            pattern: String::new(),
            paths: vec![PathBuf::from(".")],
            case_insensitive: false,
            invert_match: false,
            line_numbers: false,
            only_matching: false,
            count_only: false,
            whole_word: false,
            recursive: false,
            concurrency: default_concurrency(),
            log_level: default_log_level(),
        }
    }
}

impl SearchConfig {
    /// Creates a configuration for the given pattern and targets
    pub fn new(pattern: impl Into<String>, paths: Vec<PathBuf>) -> Self {
        SearchConfig {
            pattern: pattern.into(),
            paths,
            ..Default::default()
        }
    }

    /// Builder method to enable case-insensitive matching
    pub fn with_case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    /// Builder method to invert the match
    pub fn with_invert_match(mut self, yes: bool) -> Self {
        self.invert_match = yes;
        self
    }

    /// Builder method to enable line-number output
    pub fn with_line_numbers(mut self, yes: bool) -> Self {
        self.line_numbers = yes;
        self
    }

    /// Builder method to output only the matched substrings
    pub fn with_only_matching(mut self, yes: bool) -> Self {
        self.only_matching = yes;
        self
    }

    /// Builder method to enable count-only output
    pub fn with_count_only(mut self, yes: bool) -> Self {
        self.count_only = yes;
        self
    }

    /// Builder method to require whole-word matches
    pub fn with_whole_word(mut self, yes: bool) -> Self {
        self.whole_word = yes;
        self
    }

    /// Builder method to enable recursive descent
    pub fn with_recursive(mut self, yes: bool) -> Self {
        self.recursive = yes;
        self
    }

    /// Builder method to set the worker count
    pub fn with_concurrency(mut self, count: NonZeroUsize) -> Self {
        self.concurrency = count;
        self
    }

    /// Loads flag defaults from the default config locations
    pub fn load() -> SearchResult<Self> {
        Self::load_from(None)
    }

    /// Loads flag defaults, optionally including a custom config file
    pub fn load_from(config_path: Option<&Path>) -> SearchResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            // Global config
            dirs::config_dir().map(|p| p.join("rgrep/config.yaml")),
            // Local config
            Some(PathBuf::from(".rgrep.yaml")),
            // Custom config
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| SearchError::config_error(e.to_string()))
    }

    /// Merges CLI arguments into config-file defaults; CLI values win.
    ///
    /// Boolean flags only ever enable, so a set flag overrides the file
    /// value unconditionally. Concurrency and log level travel in
    /// `overrides` and are applied whenever the user actually passed them.
    pub fn merge_with_cli(mut self, cli: SearchConfig, overrides: CliOverrides) -> Self {
        self.pattern = cli.pattern;
        if !cli.paths.is_empty() {
            self.paths = cli.paths;
        }
        if cli.case_insensitive {
            self.case_insensitive = true;
        }
        if cli.invert_match {
            self.invert_match = true;
        }
        if cli.line_numbers {
            self.line_numbers = true;
        }
        if cli.only_matching {
            self.only_matching = true;
        }
        if cli.count_only {
            self.count_only = true;
        }
        if cli.whole_word {
            self.whole_word = true;
        }
        if cli.recursive {
            self.recursive = true;
        }
        if let Some(concurrency) = overrides.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        self
    }
}
