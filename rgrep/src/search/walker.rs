//! Directory tree traversal.

use std::fs;
use std::path::Path;
use tracing::{debug, trace};

use super::classify::{classify, PathKind};
use super::engine::WorkerContext;
use crate::results::{ErrorRecord, SearchEvent};

/// Enumerates one directory, dispatching a scan task for every regular
/// file and, in recursive mode, a walk task for every subdirectory.
///
/// In non-recursive mode subdirectories are skipped entirely: the walker
/// never descends past the directory it was given. Traversal errors
/// (an unreadable directory, a failing stat on an entry) produce one
/// error record for the offending path and enumeration continues with
/// the siblings, so one bad subtree cannot abort the walk.
pub fn walk_dir(ctx: &WorkerContext, dir: &Path) {
    trace!("walking directory: {}", dir.display());

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            ctx.emit(SearchEvent::Error(ErrorRecord {
                path: dir.to_path_buf(),
                message: e.to_string(),
            }));
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                ctx.emit(SearchEvent::Error(ErrorRecord {
                    path: dir.to_path_buf(),
                    message: e.to_string(),
                }));
                continue;
            }
        };

        let path = entry.path();
        match classify(&path) {
            Ok(PathKind::RegularFile) => ctx.enqueue_scan(path),
            Ok(PathKind::Directory) => {
                if ctx.config.recursive {
                    ctx.enqueue_walk(path);
                } else {
                    debug!("not descending into {} (non-recursive)", path.display());
                }
            }
            Ok(PathKind::Other) => {
                trace!("skipping non-regular file: {}", path.display());
            }
            Err(e) => {
                ctx.emit(SearchEvent::Error(ErrorRecord {
                    path,
                    message: e.to_string(),
                }));
            }
        }
    }
}
