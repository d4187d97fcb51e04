//! ffmpeg transcoder adapter

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{CommandError, CommandRunner, MediaTranscoder, TranscodeError};
use crate::domain::config::{AudioSettings, ImageCodec, ImageSettings, VideoSettings};

/// Runs conversions with a verified ffmpeg binary
pub struct FfmpegTranscoder<R: CommandRunner> {
    runner: R,
    binary: PathBuf,
}

impl<R: CommandRunner> FfmpegTranscoder<R> {
    pub fn new(runner: R, binary: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            binary: binary.into(),
        }
    }

    async fn transcode(
        &self,
        args: Vec<String>,
        cancel: &CancellationToken,
    ) -> Result<(), TranscodeError> {
        tracing::debug!(binary = %self.binary.display(), args = %args.join(" "), "running ffmpeg");

        match self.runner.run(&self.binary, &args, cancel).await {
            Ok(_) => Ok(()),
            Err(CommandError::Cancelled) => Err(TranscodeError::Cancelled),
            Err(CommandError::Spawn { message, .. }) => Err(TranscodeError::Spawn(message)),
            Err(CommandError::Failed { output, .. }) => Err(TranscodeError::Conversion { output }),
        }
    }
}

fn arg(value: impl Into<String>) -> String {
    value.into()
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn common_prefix(input: &Path) -> Vec<String> {
    vec![
        arg("-y"),
        arg("-hide_banner"),
        arg("-loglevel"),
        arg("warning"),
        arg("-i"),
        path_arg(input),
    ]
}

fn metadata_args() -> [String; 4] {
    [
        arg("-map_metadata"),
        arg("0"),
        arg("-movflags"),
        arg("use_metadata_tags"),
    ]
}

/// Arguments to shrink an image
pub fn image_args(input: &Path, output: &Path, settings: &ImageSettings) -> Vec<String> {
    // Input option, so it has to precede `-i`
    let mut args = vec![arg("-noautorotate")];
    args.extend(common_prefix(input));
    args.extend([arg("-vf"), format!("scale={}", settings.scale)]);
    args.extend(metadata_args());
    args.extend([arg("-c:v"), arg(settings.codec.as_str())]);

    match settings.codec {
        ImageCodec::Mjpeg => args.extend([arg("-qscale:v"), settings.qscale.to_string()]),
        ImageCodec::LibaomAv1 => args.extend([
            arg("-still-picture"),
            arg("1"),
            arg("-crf"),
            settings.crf.to_string(),
        ]),
    }

    args.push(path_arg(output));
    args
}

/// Arguments to shrink an audio file
pub fn audio_args(input: &Path, output: &Path, settings: &AudioSettings) -> Vec<String> {
    let mut args = common_prefix(input);
    args.extend([arg("-c:a"), arg(settings.codec.as_str())]);

    match &settings.bitrate {
        Some(bitrate) => args.extend([arg("-b:a"), arg(bitrate.as_str())]),
        None => args.extend([arg("-qscale:a"), settings.qscale.to_string()]),
    }

    if settings.is_opus() {
        args.extend([
            arg("-vbr"),
            arg("on"),
            arg("-compression_level"),
            arg("10"),
            arg("-application"),
            arg("audio"),
        ]);
    }

    args.extend(metadata_args());
    args.push(path_arg(output));
    args
}

/// Arguments to shrink a video, keeping even dimensions and the audio as is
pub fn video_args(input: &Path, output: &Path, settings: &VideoSettings) -> Vec<String> {
    let mut args = common_prefix(input);
    args.extend([
        arg("-vf"),
        format!(
            "scale='{}',crop='iw-mod(iw,2)':'ih-mod(ih,2)'",
            settings.scale
        ),
        arg("-c:v"),
        arg(settings.codec.as_str()),
        arg("-crf"),
        settings.crf.to_string(),
        arg("-preset"),
        arg(settings.preset.as_str()),
        arg("-c:a"),
        arg("copy"),
    ]);
    args.extend(metadata_args());
    args.push(path_arg(output));
    args
}

#[async_trait]
impl<R: CommandRunner> MediaTranscoder for FfmpegTranscoder<R> {
    async fn image(
        &self,
        input: &Path,
        output: &Path,
        settings: &ImageSettings,
        cancel: &CancellationToken,
    ) -> Result<(), TranscodeError> {
        self.transcode(image_args(input, output, settings), cancel)
            .await
    }

    async fn audio(
        &self,
        input: &Path,
        output: &Path,
        settings: &AudioSettings,
        cancel: &CancellationToken,
    ) -> Result<(), TranscodeError> {
        self.transcode(audio_args(input, output, settings), cancel)
            .await
    }

    async fn video(
        &self,
        input: &Path,
        output: &Path,
        settings: &VideoSettings,
        cancel: &CancellationToken,
    ) -> Result<(), TranscodeError> {
        self.transcode(video_args(input, output, settings), cancel)
            .await
    }
}
