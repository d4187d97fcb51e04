//! Media transcoding port interface

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::config::{AudioSettings, ImageSettings, VideoSettings};

/// Transcoding errors
#[derive(Debug, Clone, Error)]
pub enum TranscodeError {
    #[error("Failed to start ffmpeg: {0}")]
    Spawn(String),

    /// ffmpeg ran and failed; `output` is its own diagnostic text
    #[error("ffmpeg failed: {output}")]
    Conversion { output: String },

    #[error("Conversion was cancelled")]
    Cancelled,
}

/// Port for converting a single media file
#[async_trait]
pub trait MediaTranscoder: Send + Sync {
    async fn image(
        &self,
        input: &Path,
        output: &Path,
        settings: &ImageSettings,
        cancel: &CancellationToken,
    ) -> Result<(), TranscodeError>;

    async fn audio(
        &self,
        input: &Path,
        output: &Path,
        settings: &AudioSettings,
        cancel: &CancellationToken,
    ) -> Result<(), TranscodeError>;

    async fn video(
        &self,
        input: &Path,
        output: &Path,
        settings: &VideoSettings,
        cancel: &CancellationToken,
    ) -> Result<(), TranscodeError>;
}
