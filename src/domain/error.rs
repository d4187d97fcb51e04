//! Domain error types

use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

/// Error when parsing or extracting a version string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("version \"{input}\" has {count} fields but expected 2 or 3 fields")]
    FieldCount { input: String, count: usize },

    #[error("parsing {field} version of \"{input}\": {source}")]
    InvalidNumber {
        field: &'static str,
        input: String,
        source: ParseIntError,
    },

    #[error("version not found in {text:?}")]
    NotFound { text: String },
}

/// Error when no prebuilt ffmpeg exists for the running platform
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("platform not supported: {os} {arch}")]
pub struct PlatformError {
    pub os: String,
    pub arch: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("reading settings file {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("parsing settings file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("writing settings file {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("in {}: {source}", path.display())]
    InFile {
        path: PathBuf,
        source: Box<ConfigError>,
    },

    #[error("Config file already exists at: {}", .0.display())]
    AlreadyExists(PathBuf),
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::ValidationError {
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Tag an error with the settings file it came from
    pub fn in_file(path: impl Into<PathBuf>, source: ConfigError) -> Self {
        Self::InFile {
            path: path.into(),
            source: Box::new(source),
        }
    }
}
