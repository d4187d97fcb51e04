//! Recursive input directory walk

use std::fs;
use std::io;
use std::path::Path;

use crate::domain::media::{MediaExtensions, MediaFiles};

/// Collect every file below `root`, grouped by kind.
///
/// Entries are visited in name order, depth first; directories themselves
/// are not reported.
pub fn walk(root: &Path, extensions: &MediaExtensions) -> io::Result<MediaFiles> {
    let mut files = MediaFiles::default();
    walk_dir(root, extensions, &mut files)?;
    Ok(files)
}

fn walk_dir(dir: &Path, extensions: &MediaExtensions, files: &mut MediaFiles) -> io::Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            walk_dir(&path, extensions, files)?;
        } else {
            files.push(extensions.classify(&path), path);
        }
    }
    Ok(())
}
