//! Batch shrinking use case

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::config::Settings;
use crate::domain::media::{output_paths, MediaFiles, MediaKind, OutputPaths};
use crate::domain::size::diff_string;
use crate::domain::stats::RunStats;
use crate::infrastructure::media::walk;

use super::ports::{MediaTranscoder, TranscodeError};

/// Order in which kinds of files are processed
const PROCESSING_ORDER: [MediaKind; 4] = [
    MediaKind::Other,
    MediaKind::Audio,
    MediaKind::Image,
    MediaKind::Video,
];

/// Errors that stop the whole batch
#[derive(Debug, Clone, Error)]
pub enum TinifyError {
    #[error("reading input directory {}: {message}", .dir.display())]
    InputDir { dir: PathBuf, message: String },

    #[error("creating output directory {}: {message}", .dir.display())]
    OutputDir { dir: PathBuf, message: String },
}

/// Errors for a single file; the batch carries on after them
#[derive(Debug, Clone, Error)]
pub enum FileError {
    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error("{context}: {message}")]
    Io { context: String, message: String },
}

impl FileError {
    fn io(context: impl Into<String>) -> impl FnOnce(io::Error) -> Self {
        let context = context.into();
        move |e| Self::Io {
            context,
            message: e.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Transcode(TranscodeError::Cancelled))
    }
}

/// What happened to a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Output present and overriding is off
    AlreadyExists,
    /// Non-media file copied as is
    Copied,
    /// Media transcoded; `replaced` when the input was kept because it was smaller
    Transcoded { diff: String, replaced: bool },
}

/// Output from the tinify use case
#[derive(Debug, Clone)]
pub struct TinifyOutput {
    pub stats: RunStats,
    /// True when the batch stopped early on cancellation
    pub cancelled: bool,
}

/// Callbacks for progress and status updates
#[derive(Default)]
#[allow(clippy::type_complexity)]
pub struct TinifyCallbacks {
    /// Called once the input tree has been read
    pub on_scanned: Option<Box<dyn Fn(&MediaFiles) + Send + Sync>>,
    /// Called for each kind of media turned off in the settings
    pub on_kind_skipped: Option<Box<dyn Fn(MediaKind) + Send + Sync>>,
    /// Called before a file is processed
    pub on_file_start: Option<Box<dyn Fn(MediaKind, &Path) + Send + Sync>>,
    /// Called after a file is processed
    pub on_file_done:
        Option<Box<dyn Fn(MediaKind, &Path, &Result<FileOutcome, FileError>) + Send + Sync>>,
}

/// Shrinks every media file of the input tree into the output tree
pub struct TinifyUseCase<T: MediaTranscoder> {
    transcoder: T,
}

impl<T: MediaTranscoder> TinifyUseCase<T> {
    /// Create a new use case instance
    pub fn new(transcoder: T) -> Self {
        Self { transcoder }
    }

    /// Process the input tree, one file at a time
    pub async fn execute(
        &self,
        settings: &Settings,
        callbacks: TinifyCallbacks,
        cancel: &CancellationToken,
    ) -> Result<TinifyOutput, TinifyError> {
        let files = walk(&settings.input_dir, &settings.media_extensions()).map_err(|e| {
            TinifyError::InputDir {
                dir: settings.input_dir.clone(),
                message: e.to_string(),
            }
        })?;
        if let Some(ref cb) = callbacks.on_scanned {
            cb(&files);
        }

        tokio::fs::create_dir_all(&settings.output_dir)
            .await
            .map_err(|e| TinifyError::OutputDir {
                dir: settings.output_dir.clone(),
                message: e.to_string(),
            })?;

        let mut stats = RunStats::new();

        for kind in PROCESSING_ORDER {
            if is_skipped(settings, kind) {
                if let Some(ref cb) = callbacks.on_kind_skipped {
                    cb(kind);
                }
                continue;
            }

            for input in files_of(&files, kind) {
                let input = input.as_path();
                if let Some(ref cb) = callbacks.on_file_start {
                    cb(kind, input);
                }

                let result = self
                    .process(kind, input, settings, &mut stats, cancel)
                    .await;
                if matches!(&result, Err(e) if !e.is_cancelled()) {
                    stats.failures += 1;
                }
                if let Some(ref cb) = callbacks.on_file_done {
                    cb(kind, input, &result);
                }

                if cancel.is_cancelled() {
                    return Ok(TinifyOutput {
                        stats,
                        cancelled: true,
                    });
                }
            }
        }

        Ok(TinifyOutput {
            stats,
            cancelled: false,
        })
    }

    async fn process(
        &self,
        kind: MediaKind,
        input: &Path,
        settings: &Settings,
        stats: &mut RunStats,
        cancel: &CancellationToken,
    ) -> Result<FileOutcome, FileError> {
        let paths = output_paths(
            &settings.input_dir,
            input,
            &settings.output_dir,
            output_extension(settings, kind),
        );

        let exists = paths
            .output
            .try_exists()
            .map_err(FileError::io("checking output file"))?;
        if exists {
            if !settings.override_output {
                return Ok(FileOutcome::AlreadyExists);
            }
            fs::remove_file(&paths.output).map_err(FileError::io("removing existing output file"))?;
        }

        if let Some(parent) = paths.output.parent() {
            fs::create_dir_all(parent).map_err(FileError::io("creating parent output directory"))?;
        }

        let temp = TempOutput::new(&paths);
        match kind {
            MediaKind::Other => return copy_other(input, &paths.output),
            MediaKind::Image => {
                self.transcoder
                    .image(input, temp.path(), &settings.image, cancel)
                    .await?
            }
            MediaKind::Audio => {
                self.transcoder
                    .audio(input, temp.path(), &settings.audio, cancel)
                    .await?
            }
            MediaKind::Video => {
                self.transcoder
                    .video(input, temp.path(), &settings.video, cancel)
                    .await?
            }
        }

        let outcome = keep_smallest(input, temp.path(), stats)?;
        copy_modified_time(input, temp.path()).map_err(FileError::io("copying modification time"))?;
        fs::rename(temp.path(), &paths.output)
            .map_err(FileError::io("renaming temp output file to final output file"))?;

        Ok(outcome)
    }
}

fn is_skipped(settings: &Settings, kind: MediaKind) -> bool {
    match kind {
        MediaKind::Image => settings.image.skip,
        MediaKind::Audio => settings.audio.skip,
        MediaKind::Video => settings.video.skip,
        MediaKind::Other => false,
    }
}

fn output_extension(settings: &Settings, kind: MediaKind) -> Option<&str> {
    match kind {
        MediaKind::Image => Some(&settings.image.output_extension),
        MediaKind::Audio => Some(&settings.audio.output_extension),
        MediaKind::Video => Some(&settings.video.output_extension),
        MediaKind::Other => None,
    }
}

fn files_of(files: &MediaFiles, kind: MediaKind) -> &[PathBuf] {
    match kind {
        MediaKind::Image => &files.images,
        MediaKind::Audio => &files.audios,
        MediaKind::Video => &files.videos,
        MediaKind::Other => &files.others,
    }
}

fn copy_other(input: &Path, output: &Path) -> Result<FileOutcome, FileError> {
    fs::copy(input, output).map_err(FileError::io("copying file"))?;
    if let Err(e) = copy_modified_time(input, output) {
        let _ = fs::remove_file(output);
        return Err(FileError::io("copying modification time")(e));
    }
    Ok(FileOutcome::Copied)
}

/// Account sizes, and put the input bytes back when transcoding made it bigger
fn keep_smallest(input: &Path, output: &Path, stats: &mut RunStats) -> Result<FileOutcome, FileError> {
    let input_size = fs::metadata(input)
        .map_err(FileError::io("getting input file size"))?
        .len();
    let output_size = fs::metadata(output)
        .map_err(FileError::io("getting output file size"))?
        .len();

    stats.input_bytes += input_size;
    let diff = diff_string(output_size, input_size);

    if output_size <= input_size {
        stats.output_bytes += output_size;
        return Ok(FileOutcome::Transcoded {
            diff,
            replaced: false,
        });
    }

    fs::copy(input, output).map_err(FileError::io("replacing output with input"))?;
    stats.output_bytes += input_size;
    Ok(FileOutcome::Transcoded {
        diff,
        replaced: true,
    })
}

fn copy_modified_time(from: &Path, to: &Path) -> io::Result<()> {
    let modified = fs::metadata(from)?.modified()?;
    File::options().write(true).open(to)?.set_modified(modified)
}

/// Temp transcoding target, removed when dropped unless renamed away
struct TempOutput {
    path: PathBuf,
}

impl TempOutput {
    fn new(paths: &OutputPaths) -> Self {
        Self {
            path: paths.temp.clone(),
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempOutput {
    fn drop(&mut self) {
        // Best-effort cleanup
        let _ = fs::remove_file(&self.path);
    }
}
