//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like ffmpeg, HTTP and the filesystem.

pub mod archive;
pub mod config;
pub mod engine;
pub mod http;
pub mod lookup;
pub mod media;
pub mod process;

// Re-export adapters
pub use config::XdgConfigStore;
pub use engine::FfmpegTranscoder;
pub use http::ReqwestDownloader;
pub use lookup::WhichLookup;
pub use process::TokioCommandRunner;
