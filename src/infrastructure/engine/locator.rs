//! Recursive binary search in a directory tree

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Find the first file named like one of `names` below `root`.
///
/// Files of a directory are checked before any of its subdirectories,
/// and entries are visited in name order. A missing `root` is not an error.
pub fn search(root: &Path, names: &[&str]) -> io::Result<Option<PathBuf>> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let mut entries = entries.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut subdirs = Vec::new();
    for entry in entries {
        if entry.file_type()?.is_dir() {
            subdirs.push(entry.path());
            continue;
        }
        let file_name = entry.file_name();
        if names.iter().any(|name| file_name == *name) {
            return Ok(Some(entry.path()));
        }
    }

    for dir in subdirs {
        if let Some(found) = search(&dir, names)? {
            return Ok(Some(found));
        }
    }

    Ok(None)
}
