//! Media classification and output path derivation

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Kind of input file, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    Other,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// Lowercase extensions (with leading dot) recognized per media kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaExtensions {
    pub image: Vec<String>,
    pub audio: Vec<String>,
    pub video: Vec<String>,
}

impl MediaExtensions {
    /// Classify a file path. Images win over audio, audio over video.
    pub fn classify(&self, path: &Path) -> MediaKind {
        let lowered = path.to_string_lossy().to_lowercase();
        let matches = |extensions: &[String]| extensions.iter().any(|ext| lowered.ends_with(ext));

        if matches(&self.image) {
            MediaKind::Image
        } else if matches(&self.audio) {
            MediaKind::Audio
        } else if matches(&self.video) {
            MediaKind::Video
        } else {
            MediaKind::Other
        }
    }
}

/// Input files grouped by kind, each list in walk order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaFiles {
    pub images: Vec<PathBuf>,
    pub audios: Vec<PathBuf>,
    pub videos: Vec<PathBuf>,
    pub others: Vec<PathBuf>,
}

impl MediaFiles {
    pub fn push(&mut self, kind: MediaKind, path: PathBuf) {
        match kind {
            MediaKind::Image => self.images.push(path),
            MediaKind::Audio => self.audios.push(path),
            MediaKind::Video => self.videos.push(path),
            MediaKind::Other => self.others.push(path),
        }
    }

    pub fn len(&self) -> usize {
        self.images.len() + self.audios.len() + self.videos.len() + self.others.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Final and temporary output locations for one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Where the transcoder writes; renamed into place when done
    pub temp: PathBuf,
    pub output: PathBuf,
}

/// Mirror `input` below `output_dir`.
///
/// The part of `input` below `input_root` is kept; when `input` is not under
/// `input_root`, its first path component is dropped instead. A non-empty
/// `output_ext` (e.g. `.opus`) replaces the file extension.
pub fn output_paths(
    input_root: &Path,
    input: &Path,
    output_dir: &Path,
    output_ext: Option<&str>,
) -> OutputPaths {
    let relative: PathBuf = match input.strip_prefix(input_root) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => input
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .skip(1)
            .collect(),
    };

    let relative = match output_ext {
        Some(ext) if !ext.is_empty() => relative.with_extension(ext.trim_start_matches('.')),
        _ => relative,
    };

    let output = output_dir.join(relative);
    let file_name = output
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp = output.with_file_name(format!("tmp_{file_name}"));

    OutputPaths { temp, output }
}
