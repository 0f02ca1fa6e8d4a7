use clap::error::ErrorKind;
use clap::Parser;
use rgrep::config::CliOverrides;
use rgrep::{search, SearchConfig};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Concurrent, recursive line search across files and directory trees
#[derive(Parser)]
#[command(name = "rgrep", version, about, long_about = None)]
struct Cli {
    /// Pattern to search for (regex syntax)
    pattern: String,

    /// Files or directories to search
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Ignore case when matching
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Select non-matching lines instead of matching ones
    #[arg(short = 'v', long)]
    invert_match: bool,

    /// Prefix each output line with its 1-based line number
    #[arg(short = 'n', long)]
    line_number: bool,

    /// Print only the matched parts of each line
    #[arg(short = 'o', long)]
    only_matching: bool,

    /// Print one match count per file instead of matching lines
    #[arg(short = 'c', long)]
    count: bool,

    /// Match whole words only
    #[arg(short = 'w', long)]
    word_regexp: bool,

    /// Descend into subdirectories
    #[arg(short = 'r', long)]
    recursive: bool,

    /// Number of concurrent search tasks
    #[arg(short = 'j', long)]
    concurrency: Option<NonZeroUsize>,

    /// Path to a config file with flag defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Values that may not be collapsed into defaults before the merge,
    /// or an explicit `-j`/`--log-level` could lose to a config file
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            concurrency: self.concurrency,
            log_level: self.log_level.clone(),
        }
    }

    fn into_config(self) -> SearchConfig {
        SearchConfig::new(self.pattern, self.paths)
            .with_case_insensitive(self.ignore_case)
            .with_invert_match(self.invert_match)
            .with_line_numbers(self.line_number)
            .with_only_matching(self.only_matching)
            .with_count_only(self.count)
            .with_whole_word(self.word_regexp)
            .with_recursive(self.recursive)
    }
}

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    // A missing pattern must exit 1 with usage, not clap's default code
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let is_fatal = !matches!(
                e.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            );
            let _ = e.print();
            return if is_fatal {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let config_path = cli.config.clone();
    let overrides = cli.overrides();
    let cli_config = cli.into_config();

    // Config files supply flag defaults; CLI values win
    let base = match SearchConfig::load_from(config_path.as_deref()) {
        Ok(file_config) => file_config,
        Err(e) => {
            // Logging is not up yet, so report on stderr and continue
            eprintln!("rgrep: ignoring config file: {e}");
            SearchConfig::default()
        }
    };
    let config = base.merge_with_cli(cli_config, overrides);

    setup_logging(&config.log_level);

    let stream = match search(&config) {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("rgrep: {e}");
            return ExitCode::from(1);
        }
    };

    // Drain to closure in arrival order; per-path errors are output
    // lines, never process failures
    let mut errors = 0u64;
    for event in stream {
        if matches!(event, rgrep::SearchEvent::Error(_)) {
            errors += 1;
        }
        println!("{event}");
    }
    if errors > 0 {
        warn!(errors, "run completed with per-path errors");
    }

    ExitCode::SUCCESS
}
