//! ffmpeg adapters: locating, probing and driving the binary

pub mod ffmpeg;
pub mod locator;
pub mod probe;

pub use ffmpeg::FfmpegTranscoder;
pub use locator::search;
pub use probe::{probe_version, ProbeError};

use std::path::PathBuf;

/// `<user cache dir>/tinier/ffmpeg`, owned by this tool
pub fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("tinier").join("ffmpeg"))
}
