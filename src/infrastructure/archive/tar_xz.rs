//! tar.xz extraction, streamed entry by entry

use std::io::Read;
use std::path::Path;

use tar::{Archive, EntryType};
use xz2::read::XzDecoder;

use super::{create_dir, sanitize_entry_path, write_file, ArchiveError};

pub fn extract<R: Read>(reader: R, destination: &Path) -> Result<(), ArchiveError> {
    let mut archive = Archive::new(XzDecoder::new(reader));
    let entries = archive
        .entries()
        .map_err(|e| ArchiveError::io("reading tar stream", e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| ArchiveError::io("reading next tar header", e))?;
        let name = entry
            .path()
            .map_err(|e| ArchiveError::Malformed(e.to_string()))?
            .to_string_lossy()
            .into_owned();
        let header = entry.header();
        let kind = header.entry_type();
        let mode = header
            .mode()
            .map_err(|e| ArchiveError::Malformed(format!("mode of {name}: {e}")))?;

        match kind {
            // Extended metadata, not content
            EntryType::XGlobalHeader | EntryType::XHeader => continue,
            EntryType::Directory => {
                let path = sanitize_entry_path(destination, &name)?;
                create_dir(&path, mode)?;
            }
            EntryType::Regular | EntryType::Continuous => {
                let path = sanitize_entry_path(destination, &name)?;
                write_file(&mut entry, &path, mode)?;
            }
            other => {
                sanitize_entry_path(destination, &name)?;
                return Err(ArchiveError::UnsupportedEntry {
                    path: name,
                    kind: format!("{other:?}"),
                });
            }
        }
    }

    Ok(())
}

/// Build an in-memory tar.xz holding regular files
#[cfg(test)]
pub(crate) fn test_archive(files: &[(&str, &str, u32)]) -> Vec<u8> {
    use tar::{Builder, Header};
    use xz2::write::XzEncoder;

    let mut builder = Builder::new(XzEncoder::new(Vec::new(), 6));
    for (name, content, mode) in files {
        let mut header = Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(*mode);
        header.set_entry_type(EntryType::Regular);
        builder
            .append_data(&mut header, name, content.as_bytes())
            .expect("append tar entry");
    }
    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish xz")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tar::{Builder, Header};
    use xz2::write::XzEncoder;

    use super::*;

    /// `Builder::append_data` refuses `..`, so write the raw name field
    fn archive_with_raw_name(name: &str, entry_type: EntryType) -> Vec<u8> {
        let mut builder = Builder::new(XzEncoder::new(Vec::new(), 6));
        let mut header = Header::new_gnu();
        header.as_old_mut().name[..name.len()].copy_from_slice(name.as_bytes());
        header.set_size(4);
        header.set_mode(0o644);
        header.set_entry_type(entry_type);
        header.set_cksum();
        builder.append(&header, &b"evil"[..]).unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn extracts_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();

        let mut builder = Builder::new(XzEncoder::new(Vec::new(), 6));
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Directory);
        header.set_mode(0o755);
        header.set_size(0);
        builder
            .append_data(&mut header, "ffmpeg-6.0-amd64-static/", std::io::empty())
            .unwrap();
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_mode(0o755);
        header.set_size(3);
        builder
            .append_data(&mut header, "ffmpeg-6.0-amd64-static/ffmpeg", &b"elf"[..])
            .unwrap();
        let bytes = builder.into_inner().unwrap().finish().unwrap();

        extract(bytes.as_slice(), dir.path()).unwrap();

        let binary = dir.path().join("ffmpeg-6.0-amd64-static/ffmpeg");
        assert_eq!(fs::read(&binary).unwrap(), b"elf");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&binary).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn rejects_tainted_path() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("cache");
        fs::create_dir(&dest).unwrap();

        let bytes = archive_with_raw_name("../../evil", EntryType::Regular);
        let err = extract(bytes.as_slice(), &dest).unwrap_err();

        assert!(matches!(err, ArchiveError::TaintedPath { .. }));
        assert!(!dir.path().join("evil").exists());
    }

    #[test]
    fn unreadable_mode_is_malformed() {
        let dir = tempfile::tempdir().unwrap();

        let mut builder = Builder::new(XzEncoder::new(Vec::new(), 6));
        let mut header = Header::new_gnu();
        header.set_path("ffmpeg").unwrap();
        header.set_size(3);
        header.set_entry_type(EntryType::Regular);
        header.as_old_mut().mode = *b"zzzzzzz\0";
        header.set_cksum();
        builder.append(&header, &b"elf"[..]).unwrap();
        let bytes = builder.into_inner().unwrap().finish().unwrap();

        let err = extract(bytes.as_slice(), dir.path()).unwrap_err();
        assert!(matches!(err, ArchiveError::Malformed(ref m) if m.starts_with("mode of ffmpeg")));
        assert!(!dir.path().join("ffmpeg").exists());
    }

    #[test]
    fn rejects_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = archive_with_raw_name("link", EntryType::Symlink);

        let err = extract(bytes.as_slice(), dir.path()).unwrap_err();
        assert!(matches!(err, ArchiveError::UnsupportedEntry { path, .. } if path == "link"));
    }

    #[test]
    fn garbage_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract(&b"not an xz stream"[..], dir.path());
        assert!(result.is_err());
    }
}
