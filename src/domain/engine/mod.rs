//! Transcoding engine domain: where binaries come from and how they are fetched

pub mod platform;

use std::fmt;
use std::path::PathBuf;

use crate::domain::version::Version;

pub use platform::{ArchiveFormat, ArmFeatures, EngineDownload, Platform};

/// Binary names searched for in extracted archives and the cache
pub const ENGINE_BINARY_NAMES: &[&str] = &["ffmpeg", "ffmpeg.exe"];

/// Binary name looked up on the PATH
pub const ENGINE_PATH_NAME: &str = "ffmpeg";

/// Candidate sources, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineSource {
    UserPath,
    LocalCache,
    SystemPath,
    Download,
}

impl fmt::Display for EngineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UserPath => "user path",
            Self::LocalCache => "local cache",
            Self::SystemPath => "system PATH",
            Self::Download => "download",
        };
        write!(f, "{name}")
    }
}

/// A verified ffmpeg binary ready for use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredEngine {
    /// Absolute path to the binary
    pub path: PathBuf,
    pub version: Version,
    pub source: EngineSource,
}
