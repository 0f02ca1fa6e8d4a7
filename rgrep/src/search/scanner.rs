//! Line-by-line file scanning.

use crossbeam_channel::Sender;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::trace;

use super::matcher::PatternMatcher;
use crate::config::SearchConfig;
use crate::results::{CountRecord, ErrorRecord, MatchRecord, SearchEvent};

const BUFFER_CAPACITY: usize = 65536;

/// Scans one file, emitting match, count, or error records into the sink.
///
/// The file is streamed a line at a time, so memory use is bounded by the
/// longest line, not the file size. A final line without a terminator is
/// still scanned. Invalid UTF-8 is decoded lossily rather than failing
/// the scan.
///
/// Failure is local to this file: an open error produces one error
/// record and returns; a read error mid-stream produces one error record
/// and abandons the rest of the file (records already emitted stand, and
/// no count record follows). A disconnected sink means the consumer is
/// gone, so the scan stops early.
pub fn scan_file(
    path: &Path,
    matcher: &PatternMatcher,
    config: &SearchConfig,
    sink: &Sender<SearchEvent>,
) {
    trace!("scanning file: {}", path.display());

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            let _ = sink.send(SearchEvent::Error(ErrorRecord {
                path: path.to_path_buf(),
                message: e.to_string(),
            }));
            return;
        }
    };

    let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
    let mut buf = Vec::new();
    let mut line_number: u64 = 0;
    let mut match_count: u64 = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                let _ = sink.send(SearchEvent::Error(ErrorRecord {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }));
                return;
            }
        }
        line_number += 1;

        // Strip the terminator (and a preceding \r) before matching
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }

        let line = String::from_utf8_lossy(&buf);
        let matches = matcher.find_matches(&line);

        // Inclusion: matching lines normally, non-matching lines inverted
        if matches.is_empty() != config.invert_match {
            continue;
        }

        if config.count_only {
            match_count += 1;
            continue;
        }

        let record = render_line(path, line_number, &line, &matches, config);
        if sink.send(SearchEvent::Match(record)).is_err() {
            return;
        }
    }

    if config.count_only {
        let _ = sink.send(SearchEvent::Count(CountRecord {
            path: path.to_path_buf(),
            matches: match_count,
        }));
    }
}

/// Renders one selected line as a match record.
///
/// Line-number output takes priority over only-matching output when both
/// are requested.
fn render_line(
    path: &Path,
    line_number: u64,
    line: &str,
    matches: &[(usize, usize)],
    config: &SearchConfig,
) -> MatchRecord {
    if config.line_numbers {
        MatchRecord {
            path: path.to_path_buf(),
            line_number: Some(line_number),
            line: line.to_string(),
        }
    } else if config.only_matching {
        let joined = matches
            .iter()
            .map(|&(start, end)| &line[start..end])
            .collect::<Vec<_>>()
            .join(" ");
        MatchRecord {
            path: path.to_path_buf(),
            line_number: None,
            line: joined,
        }
    } else {
        MatchRecord {
            path: path.to_path_buf(),
            line_number: None,
            line: line.to_string(),
        }
    }
}
