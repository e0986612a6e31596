//! Case-insensitive path lookup.
//!
//! Forensic images of NTFS volumes are usually mounted on case-sensitive
//! hosts, so `Windows/System32/config/SYSTEM` may be spelled in any casing on
//! disk. These helpers walk a path one segment at a time and match each
//! segment the way Windows would, returning the casing actually found on disk.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

/// Finds the entry of `dir` whose name equals `name`, ignoring case.
///
/// Returns the on-disk spelling of the entry. A missing or unreadable
/// directory is reported as `None`; the caller decides whether that matters.
/// When several entries differ only in case, the first one listed wins.
pub fn find_entry_nocase(dir: &Path, name: &str) -> Option<OsString> {
    let wanted = name.to_lowercase();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot list {}: {}", dir.display(), e);
            return None;
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name())
        .find(|file_name| file_name.to_string_lossy().to_lowercase() == wanted)
}

/// Resolves `segments` below `root`, one directory level at a time.
///
/// Stops at the first segment that has no case-insensitive match.
pub fn find_path_nocase<S: AsRef<str>>(root: &Path, segments: &[S]) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();

    for segment in segments {
        let actual = find_entry_nocase(&resolved, segment.as_ref())?;
        resolved.push(actual);
    }

    Some(resolved)
}
