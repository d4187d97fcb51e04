//! Archive download port interface

use std::pin::Pin;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Body of a download, read incrementally
pub type ByteStream = Pin<Box<dyn AsyncRead + Send>>;

/// Download errors
#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    #[error("Download request failed: {0}")]
    RequestFailed(String),

    #[error("Download of {url} failed with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },
}

/// Port for fetching release archives
#[async_trait]
pub trait ArchiveDownloader: Send + Sync {
    /// Start a download and return its body as a stream.
    ///
    /// Errors while reading the body surface as `io::Error`s from the stream.
    async fn fetch(&self, url: &str) -> Result<ByteStream, DownloadError>;
}
