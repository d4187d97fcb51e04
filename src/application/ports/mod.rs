//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod command;
pub mod config;
pub mod downloader;
pub mod lookup;
pub mod transcoder;

// Re-export common types
pub use command::{CommandError, CommandRunner};
pub use config::ConfigStore;
pub use downloader::{ArchiveDownloader, ByteStream, DownloadError};
pub use lookup::BinaryLookup;
pub use transcoder::{MediaTranscoder, TranscodeError};
