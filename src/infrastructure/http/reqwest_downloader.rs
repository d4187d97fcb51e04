//! reqwest archive downloader

use std::io;

use async_trait::async_trait;
use futures::TryStreamExt;
use tokio_util::io::StreamReader;

use crate::application::ports::{ArchiveDownloader, ByteStream, DownloadError};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Streams release archives over HTTP(S)
pub struct ReqwestDownloader {
    client: reqwest::Client,
}

impl ReqwestDownloader {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for ReqwestDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArchiveDownloader for ReqwestDownloader {
    async fn fetch(&self, url: &str) -> Result<ByteStream, DownloadError> {
        tracing::debug!(url, "downloading archive");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes_stream()
            .map_err(io::Error::other);
        Ok(Box::pin(StreamReader::new(body)))
    }
}
