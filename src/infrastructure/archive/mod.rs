//! Release archive extraction
//!
//! Archives arrive as an async byte stream. Extraction itself is synchronous
//! (`tar`, `xz2`, `zip`) and runs on a blocking thread fed through
//! `SyncIoBridge`, so a tar.xz download is unpacked while it streams in.

pub mod tar_xz;
pub mod zip_archive;

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tokio_util::io::SyncIoBridge;

use crate::application::ports::ByteStream;
use crate::domain::engine::ArchiveFormat;

/// Extraction errors
#[derive(Debug, Clone, Error)]
pub enum ArchiveError {
    #[error("archive content path is tainted: {path}")]
    TaintedPath { path: String },

    #[error("archive entry {path} has unsupported type {kind}")]
    UnsupportedEntry { path: String, kind: String },

    #[error("malformed archive: {0}")]
    Malformed(String),

    #[error("{context}: {message}")]
    Io { context: String, message: String },
}

impl ArchiveError {
    fn io(context: impl Into<String>, err: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            message: err.to_string(),
        }
    }
}

/// Extract `stream` into `destination` according to `format`.
///
/// Entries already written stay on disk when extraction fails.
pub async fn extract(
    stream: ByteStream,
    format: ArchiveFormat,
    destination: &Path,
) -> Result<(), ArchiveError> {
    let destination = destination.to_path_buf();
    let reader = SyncIoBridge::new(stream);

    tokio::task::spawn_blocking(move || match format {
        ArchiveFormat::TarXz => tar_xz::extract(reader, &destination),
        ArchiveFormat::Zip => zip_archive::extract(reader, &destination),
    })
    .await
    .map_err(|e| ArchiveError::Io {
        context: "extraction task".to_string(),
        message: e.to_string(),
    })?
}

/// Resolve an entry name below `destination`, refusing anything that
/// would land outside of it once `..` segments are folded away.
pub fn sanitize_entry_path(destination: &Path, name: &str) -> Result<PathBuf, ArchiveError> {
    let root = clean(destination);
    let full = clean(&destination.join(name));
    if full.starts_with(&root) {
        Ok(full)
    } else {
        Err(ArchiveError::TaintedPath {
            path: name.to_string(),
        })
    }
}

/// Lexically normalize a path without touching the filesystem
fn clean(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

fn create_dir(path: &Path, mode: u32) -> Result<(), ArchiveError> {
    fs::create_dir_all(path)
        .map_err(|e| ArchiveError::io(format!("creating directory {}", path.display()), e))?;
    set_mode(path, mode)
}

fn write_file(reader: &mut impl Read, path: &Path, mode: u32) -> Result<(), ArchiveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| ArchiveError::io(format!("creating directory {}", parent.display()), e))?;
    }

    let mut file = File::create(path)
        .map_err(|e| ArchiveError::io(format!("creating file {}", path.display()), e))?;
    io::copy(reader, &mut file)
        .map_err(|e| ArchiveError::io(format!("writing file {}", path.display()), e))?;
    drop(file);

    set_mode(path, mode)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<(), ArchiveError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o777))
        .map_err(|e| ArchiveError::io(format!("setting permissions of {}", path.display()), e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<(), ArchiveError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_nested_entries() {
        let dest = Path::new("/cache/ffmpeg");
        let path = sanitize_entry_path(dest, "ffmpeg-6.0-static/ffmpeg").unwrap();
        assert_eq!(path, PathBuf::from("/cache/ffmpeg/ffmpeg-6.0-static/ffmpeg"));
    }

    #[test]
    fn sanitize_folds_inner_parent_dirs() {
        let dest = Path::new("/cache/ffmpeg");
        let path = sanitize_entry_path(dest, "a/../b/./ffmpeg").unwrap();
        assert_eq!(path, PathBuf::from("/cache/ffmpeg/b/ffmpeg"));
    }

    #[test]
    fn sanitize_rejects_traversal() {
        let dest = Path::new("/cache/ffmpeg");
        let err = sanitize_entry_path(dest, "../../evil").unwrap_err();
        assert!(matches!(err, ArchiveError::TaintedPath { path } if path == "../../evil"));
    }

    #[test]
    fn sanitize_rejects_sibling_with_common_prefix() {
        let dest = Path::new("/cache/ffmpeg");
        assert!(sanitize_entry_path(dest, "../ffmpeg-evil/x").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn sanitize_rejects_absolute_names() {
        let dest = Path::new("/cache/ffmpeg");
        assert!(sanitize_entry_path(dest, "/etc/passwd").is_err());
    }

    #[test]
    fn sanitize_relative_destination() {
        let path = sanitize_entry_path(Path::new("./out"), "bin/ffmpeg").unwrap();
        assert_eq!(path, PathBuf::from("out/bin/ffmpeg"));
    }

    #[tokio::test]
    async fn extract_streams_tar_xz() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = tar_xz::test_archive(&[("release/ffmpeg", "binary", 0o755)]);
        let stream: ByteStream = Box::pin(std::io::Cursor::new(bytes));

        extract(stream, ArchiveFormat::TarXz, dir.path()).await.unwrap();

        let content = fs::read(dir.path().join("release/ffmpeg")).unwrap();
        assert_eq!(content, b"binary");
    }

    #[tokio::test]
    async fn extract_zip_from_stream() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = zip_archive::test_archive(&[("release/bin/ffmpeg.exe", "binary")]);
        let stream: ByteStream = Box::pin(std::io::Cursor::new(bytes));

        extract(stream, ArchiveFormat::Zip, dir.path()).await.unwrap();

        assert!(dir.path().join("release/bin/ffmpeg.exe").is_file());
    }
}
