//! Path classification.

use std::fs;
use std::io;
use std::path::Path;

/// What kind of filesystem object a path refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// A directory
    Directory,
    /// A regular file (or a symlink resolving to one)
    RegularFile,
    /// Anything else: fifo, socket, device, dangling symlink target
    Other,
}

/// Stats a path and reports what it is.
///
/// Follows symlinks, so a link to a file classifies as `RegularFile`.
/// A stat failure is returned to the caller, which turns it into an
/// error record rather than aborting the run.
pub fn classify(path: &Path) -> io::Result<PathKind> {
    let metadata = fs::metadata(path)?;
    let file_type = metadata.file_type();
    if file_type.is_dir() {
        Ok(PathKind::Directory)
    } else if file_type.is_file() {
        Ok(PathKind::RegularFile)
    } else {
        Ok(PathKind::Other)
    }
}
