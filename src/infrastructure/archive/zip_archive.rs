//! zip extraction
//!
//! The central directory sits at the end of the file, so the whole
//! stream is buffered before any entry is written.

use std::io::{Cursor, Read};
use std::path::Path;

use zip::ZipArchive;

use super::{create_dir, sanitize_entry_path, write_file, ArchiveError};

const DEFAULT_DIR_MODE: u32 = 0o755;
const DEFAULT_FILE_MODE: u32 = 0o644;

pub fn extract<R: Read>(mut reader: R, destination: &Path) -> Result<(), ArchiveError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| ArchiveError::io("reading zip stream", e))?;

    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ArchiveError::Malformed(e.to_string()))?;

    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| ArchiveError::Malformed(e.to_string()))?;
        let path = sanitize_entry_path(destination, file.name())?;

        if file.is_dir() {
            let mode = file.unix_mode().unwrap_or(DEFAULT_DIR_MODE);
            create_dir(&path, mode)?;
        } else {
            let mode = file.unix_mode().unwrap_or(DEFAULT_FILE_MODE);
            write_file(&mut file, &path, mode)?;
        }
    }

    Ok(())
}

/// Build an in-memory zip holding regular files
#[cfg(test)]
pub(crate) fn test_archive(files: &[(&str, &str)]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().unix_permissions(0o755);
    for (name, content) in files {
        writer.start_file(*name, options).expect("start zip entry");
        writer.write_all(content.as_bytes()).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn extracts_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = test_archive(&[
            ("ffmpeg-n5.1/bin/ffmpeg.exe", "exe"),
            ("ffmpeg-n5.1/LICENSE.txt", "gpl"),
        ]);

        extract(bytes.as_slice(), dir.path()).unwrap();

        assert_eq!(
            fs::read(dir.path().join("ffmpeg-n5.1/bin/ffmpeg.exe")).unwrap(),
            b"exe"
        );
        assert_eq!(
            fs::read(dir.path().join("ffmpeg-n5.1/LICENSE.txt")).unwrap(),
            b"gpl"
        );
    }

    #[test]
    fn rejects_tainted_path() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("cache");
        fs::create_dir(&dest).unwrap();
        let bytes = test_archive(&[("../../evil", "evil")]);

        let err = extract(bytes.as_slice(), &dest).unwrap_err();

        assert!(matches!(err, ArchiveError::TaintedPath { ref path } if path == "../../evil"));
        assert!(!dir.path().join("evil").exists());
    }

    #[test]
    fn truncated_zip_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = test_archive(&[("ffmpeg.exe", "exe")]);

        let err = extract(&bytes[..bytes.len() / 2], dir.path()).unwrap_err();
        assert!(matches!(err, ArchiveError::Malformed(_)));
    }
}
