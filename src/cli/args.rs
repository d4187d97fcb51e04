//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};

use crate::domain::config::{AppConfig, AudioConfig, ImageConfig, VideoConfig};

/// Tinier - shrink a tree of images, audio and videos with ffmpeg
#[derive(Parser, Debug)]
#[command(name = "tinier")]
#[command(version)]
#[command(about = "Shrink images, audio and videos of a directory tree using ffmpeg")]
#[command(long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub options: RunOptions,

    /// Config subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key (e.g. input_dir, video.crf)
        key: String,
        /// Value to set
        value: String,
    },
    /// Get a config value from the file
    Get {
        /// Config key
        key: String,
    },
    /// List effective config values
    List,
    /// Show config file path
    Path,
}

/// Settings accepted on the command line or through `TINIER_*` variables.
///
/// Every field is optional so that unset values fall through to the
/// config file and the defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct RunOptions {
    /// Directory holding the media to shrink
    #[arg(long, env = "TINIER_INPUT_DIR_PATH", value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving the shrunk tree
    #[arg(long, env = "TINIER_OUTPUT_DIR_PATH", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// ffmpeg binary to try first
    #[arg(long, env = "TINIER_FFMPEG_PATH", value_name = "PATH")]
    pub ffmpeg_path: Option<PathBuf>,

    /// Minimum accepted ffmpeg version
    #[arg(long, env = "TINIER_FFMPEG_MIN_VERSION", value_name = "VERSION")]
    pub ffmpeg_min_version: Option<String>,

    /// Overwrite files already present in the output directory
    #[arg(
        long,
        env = "TINIER_OVERRIDE_OUTPUT",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub override_output: Option<bool>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TINIER_LOG_LEVEL", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Image file extensions, comma separated
    #[arg(long, env = "TINIER_IMAGE_EXTENSIONS", value_name = "EXTS", value_delimiter = ',')]
    pub image_extensions: Option<Vec<String>>,

    /// Extension of converted images
    #[arg(long, env = "TINIER_IMAGE_OUTPUT_EXTENSION", value_name = "EXT")]
    pub image_output_extension: Option<String>,

    /// Image ffmpeg scale
    #[arg(long, env = "TINIER_IMAGE_SCALE", value_name = "W:H")]
    pub image_scale: Option<String>,

    /// Image codec (mjpeg, libaom-av1)
    #[arg(long, env = "TINIER_IMAGE_CODEC", value_name = "CODEC")]
    pub image_codec: Option<String>,

    /// Image qscale for mjpeg
    #[arg(long, env = "TINIER_IMAGE_QSCALE", value_name = "N")]
    pub image_qscale: Option<u32>,

    /// Image CRF for libaom-av1
    #[arg(long, env = "TINIER_IMAGE_CRF", value_name = "N")]
    pub image_crf: Option<u32>,

    /// Skip image files
    #[arg(
        long,
        env = "TINIER_IMAGE_SKIP",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub image_skip: Option<bool>,

    /// Audio file extensions, comma separated
    #[arg(long, env = "TINIER_AUDIO_EXTENSIONS", value_name = "EXTS", value_delimiter = ',')]
    pub audio_extensions: Option<Vec<String>>,

    /// Extension of converted audio files
    #[arg(long, env = "TINIER_AUDIO_OUTPUT_EXTENSION", value_name = "EXT")]
    pub audio_output_extension: Option<String>,

    /// Audio codec
    #[arg(long, env = "TINIER_AUDIO_CODEC", value_name = "CODEC")]
    pub audio_codec: Option<String>,

    /// Audio qscale, used when no bitrate is set
    #[arg(long, env = "TINIER_AUDIO_QSCALE", value_name = "N")]
    pub audio_qscale: Option<u32>,

    /// Audio bitrate (e.g. 32k)
    #[arg(long, env = "TINIER_AUDIO_BITRATE", value_name = "RATE")]
    pub audio_bitrate: Option<String>,

    /// Skip audio files
    #[arg(
        long,
        env = "TINIER_AUDIO_SKIP",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub audio_skip: Option<bool>,

    /// Video file extensions, comma separated
    #[arg(long, env = "TINIER_VIDEO_EXTENSIONS", value_name = "EXTS", value_delimiter = ',')]
    pub video_extensions: Option<Vec<String>>,

    /// Extension of converted videos
    #[arg(long, env = "TINIER_VIDEO_OUTPUT_EXTENSION", value_name = "EXT")]
    pub video_output_extension: Option<String>,

    /// Video ffmpeg scale
    #[arg(long, env = "TINIER_VIDEO_SCALE", value_name = "W:H")]
    pub video_scale: Option<String>,

    /// Video codec
    #[arg(long, env = "TINIER_VIDEO_CODEC", value_name = "CODEC")]
    pub video_codec: Option<String>,

    /// Video encoder preset
    #[arg(long, env = "TINIER_VIDEO_PRESET", value_name = "PRESET")]
    pub video_preset: Option<String>,

    /// Video CRF
    #[arg(long, env = "TINIER_VIDEO_CRF", value_name = "N")]
    pub video_crf: Option<u32>,

    /// Skip video files
    #[arg(
        long,
        env = "TINIER_VIDEO_SKIP",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub video_skip: Option<bool>,
}

impl RunOptions {
    /// Build the command line layer of the configuration
    pub fn to_config(&self) -> AppConfig {
        let image = ImageConfig {
            extensions: self.image_extensions.clone(),
            output_extension: self.image_output_extension.clone(),
            scale: self.image_scale.clone(),
            codec: self.image_codec.clone(),
            qscale: self.image_qscale,
            crf: self.image_crf,
            skip: self.image_skip,
        };
        let audio = AudioConfig {
            extensions: self.audio_extensions.clone(),
            output_extension: self.audio_output_extension.clone(),
            codec: self.audio_codec.clone(),
            qscale: self.audio_qscale,
            bitrate: self.audio_bitrate.clone(),
            skip: self.audio_skip,
        };
        let video = VideoConfig {
            extensions: self.video_extensions.clone(),
            output_extension: self.video_output_extension.clone(),
            scale: self.video_scale.clone(),
            codec: self.video_codec.clone(),
            preset: self.video_preset.clone(),
            crf: self.video_crf,
            skip: self.video_skip,
        };

        AppConfig {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            ffmpeg_path: self.ffmpeg_path.clone(),
            ffmpeg_min_version: self.ffmpeg_min_version.clone(),
            override_output: self.override_output,
            log_level: self.log_level.clone(),
            image: (image != ImageConfig::default()).then_some(image),
            audio: (audio != AudioConfig::default()).then_some(audio),
            video: (video != VideoConfig::default()).then_some(video),
        }
    }
}

/// Valid config keys for set/get
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "input_dir",
    "output_dir",
    "ffmpeg_path",
    "ffmpeg_min_version",
    "override_output",
    "log_level",
    "image.extensions",
    "image.output_extension",
    "image.scale",
    "image.codec",
    "image.qscale",
    "image.crf",
    "image.skip",
    "audio.extensions",
    "audio.output_extension",
    "audio.codec",
    "audio.qscale",
    "audio.bitrate",
    "audio.skip",
    "video.extensions",
    "video.output_extension",
    "video.scale",
    "video.codec",
    "video.preset",
    "video.crf",
    "video.skip",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_without_arguments() {
        let cli = Cli::try_parse_from(["tinier"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_paths_and_versions() {
        let cli = Cli::parse_from([
            "tinier",
            "--input-dir",
            "photos",
            "--output-dir",
            "small",
            "--ffmpeg-min-version",
            "6.0",
        ]);
        assert_eq!(cli.options.input_dir, Some(PathBuf::from("photos")));
        assert_eq!(cli.options.output_dir, Some(PathBuf::from("small")));
        assert_eq!(cli.options.ffmpeg_min_version, Some("6.0".to_string()));
    }

    #[test]
    fn bool_flags_accept_bare_and_explicit_values() {
        let cli = Cli::parse_from(["tinier", "--override-output", "--video-skip", "false"]);
        assert_eq!(cli.options.override_output, Some(true));
        assert_eq!(cli.options.video_skip, Some(false));

        let cli = Cli::parse_from(["tinier", "--image-skip", "yes"]);
        assert_eq!(cli.options.image_skip, Some(true));
    }

    #[test]
    fn extensions_split_on_commas() {
        let cli = Cli::parse_from(["tinier", "--image-extensions", ".jpg,.webp"]);
        assert_eq!(
            cli.options.image_extensions,
            Some(vec![".jpg".to_string(), ".webp".to_string()])
        );
    }

    #[test]
    fn numeric_flags_reject_text() {
        assert!(Cli::try_parse_from(["tinier", "--video-crf", "high"]).is_err());
    }

    #[test]
    fn to_config_leaves_untouched_sections_empty() {
        let cli = Cli::parse_from(["tinier", "--audio-bitrate", "64k"]);
        let config = cli.options.to_config();
        assert!(config.image.is_none());
        assert!(config.video.is_none());
        assert_eq!(
            config.audio.and_then(|a| a.bitrate),
            Some("64k".to_string())
        );
        assert!(config.input_dir.is_none());
    }

    #[test]
    fn cli_parses_config_actions() {
        let cli = Cli::parse_from(["tinier", "config", "init"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Init
            })
        ));

        let cli = Cli::parse_from(["tinier", "config", "set", "video.crf", "30"]);
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "video.crf");
            assert_eq!(value, "30");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("input_dir"));
        assert!(is_valid_config_key("audio.bitrate"));
        assert!(!is_valid_config_key("video.bitrate"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
