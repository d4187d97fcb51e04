//! Application configuration value object

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::media::MediaExtensions;
use crate::domain::version::Version;

static EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.[a-z0-9]{1,5}$").expect("valid regex"));
static SCALE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+|-1):([0-9]+|-1)").expect("valid regex"));

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const SVTAV1_PRESETS: &[&str] = &[
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12",
];
const NAMED_PRESETS: &[&str] = &[
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
    "placebo",
];

/// Image section of the configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    pub extensions: Option<Vec<String>>,
    pub output_extension: Option<String>,
    pub scale: Option<String>,
    pub codec: Option<String>,
    pub qscale: Option<u32>,
    pub crf: Option<u32>,
    pub skip: Option<bool>,
}

impl ImageConfig {
    fn merge(self, other: Self) -> Self {
        Self {
            extensions: other.extensions.or(self.extensions),
            output_extension: other.output_extension.or(self.output_extension),
            scale: other.scale.or(self.scale),
            codec: other.codec.or(self.codec),
            qscale: other.qscale.or(self.qscale),
            crf: other.crf.or(self.crf),
            skip: other.skip.or(self.skip),
        }
    }
}

/// Audio section of the configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    pub extensions: Option<Vec<String>>,
    pub output_extension: Option<String>,
    pub codec: Option<String>,
    pub qscale: Option<u32>,
    /// An empty string means "use qscale instead"
    pub bitrate: Option<String>,
    pub skip: Option<bool>,
}

impl AudioConfig {
    fn merge(self, other: Self) -> Self {
        Self {
            extensions: other.extensions.or(self.extensions),
            output_extension: other.output_extension.or(self.output_extension),
            codec: other.codec.or(self.codec),
            qscale: other.qscale.or(self.qscale),
            bitrate: other.bitrate.or(self.bitrate),
            skip: other.skip.or(self.skip),
        }
    }
}

/// Video section of the configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoConfig {
    pub extensions: Option<Vec<String>>,
    pub output_extension: Option<String>,
    pub scale: Option<String>,
    pub codec: Option<String>,
    pub preset: Option<String>,
    pub crf: Option<u32>,
    pub skip: Option<bool>,
}

impl VideoConfig {
    fn merge(self, other: Self) -> Self {
        Self {
            extensions: other.extensions.or(self.extensions),
            output_extension: other.output_extension.or(self.output_extension),
            scale: other.scale.or(self.scale),
            codec: other.codec.or(self.codec),
            preset: other.preset.or(self.preset),
            crf: other.crf.or(self.crf),
            skip: other.skip.or(self.skip),
        }
    }
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub ffmpeg_path: Option<PathBuf>,
    pub ffmpeg_min_version: Option<String>,
    pub override_output: Option<bool>,
    pub log_level: Option<String>,
    pub image: Option<ImageConfig>,
    pub audio: Option<AudioConfig>,
    pub video: Option<VideoConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            input_dir: Some(PathBuf::from("input")),
            output_dir: Some(PathBuf::from("output")),
            ffmpeg_path: None,
            ffmpeg_min_version: Some("5.0.1".to_string()),
            override_output: Some(false),
            log_level: Some("info".to_string()),
            image: Some(ImageConfig {
                extensions: Some(strings(&[".jpg", ".jpeg", ".png"])),
                output_extension: Some(".jpg".to_string()),
                scale: Some("1280:-1".to_string()),
                codec: Some("mjpeg".to_string()),
                qscale: Some(5),
                crf: Some(35),
                skip: Some(false),
            }),
            audio: Some(AudioConfig {
                extensions: Some(strings(&[".mp3", ".flac"])),
                output_extension: Some(".opus".to_string()),
                codec: Some("libopus".to_string()),
                qscale: Some(5),
                // Depends on the final codec, filled in by `resolve`
                bitrate: None,
                skip: Some(false),
            }),
            video: Some(VideoConfig {
                extensions: Some(strings(&[".mp4", ".mov", ".avi"])),
                output_extension: Some(".mp4".to_string()),
                scale: Some("1280:-1".to_string()),
                codec: Some("libsvtav1".to_string()),
                preset: Some("8".to_string()),
                crf: Some(23),
                skip: Some(false),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            input_dir: other.input_dir.or(self.input_dir),
            output_dir: other.output_dir.or(self.output_dir),
            ffmpeg_path: other.ffmpeg_path.or(self.ffmpeg_path),
            ffmpeg_min_version: other.ffmpeg_min_version.or(self.ffmpeg_min_version),
            override_output: other.override_output.or(self.override_output),
            log_level: other.log_level.or(self.log_level),
            image: merge_section(self.image, other.image, ImageConfig::merge),
            audio: merge_section(self.audio, other.audio, AudioConfig::merge),
            video: merge_section(self.video, other.video, VideoConfig::merge),
        }
    }

    /// Turn a merged config into validated settings.
    ///
    /// Missing values fall back to the defaults, so an empty config resolves.
    pub fn resolve(self) -> Result<Settings, ConfigError> {
        let config = Self::defaults().merge(self);
        let image = config.image.unwrap_or_default();
        let audio = config.audio.unwrap_or_default();
        let video = config.video.unwrap_or_default();

        let ffmpeg_min_version = config.ffmpeg_min_version.unwrap_or_default();
        let ffmpeg_min_version = ffmpeg_min_version
            .parse::<Version>()
            .map_err(|e| ConfigError::invalid("ffmpeg_min_version", e.to_string()))?;

        let log_level = config.log_level.unwrap_or_default().to_lowercase();
        if !LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(ConfigError::invalid(
                "log_level",
                format!("must be one of {}", LOG_LEVELS.join(", ")),
            ));
        }

        Ok(Settings {
            input_dir: config.input_dir.unwrap_or_default(),
            output_dir: config.output_dir.unwrap_or_default(),
            ffmpeg_path: config
                .ffmpeg_path
                .filter(|path| !path.as_os_str().is_empty()),
            ffmpeg_min_version,
            override_output: config.override_output.unwrap_or(false),
            log_level,
            image: ImageSettings::resolve(image)?,
            audio: AudioSettings::resolve(audio)?,
            video: VideoSettings::resolve(video)?,
        })
    }
}

fn merge_section<T>(base: Option<T>, other: Option<T>, merge: fn(T, T) -> T) -> Option<T> {
    match (base, other) {
        (None, None) => None,
        (Some(b), None) => Some(b),
        (None, Some(o)) => Some(o),
        (Some(b), Some(o)) => Some(merge(b, o)),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn validate_extensions(key: &str, extensions: Vec<String>) -> Result<Vec<String>, ConfigError> {
    let extensions: Vec<String> = extensions
        .into_iter()
        .map(|ext| ext.trim().to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect();
    for ext in &extensions {
        if !EXTENSION.is_match(ext) {
            return Err(ConfigError::invalid(key, format!("malformed extension {ext:?}")));
        }
    }
    Ok(extensions)
}

fn validate_extension(key: &str, ext: String) -> Result<String, ConfigError> {
    if !EXTENSION.is_match(&ext) {
        return Err(ConfigError::invalid(key, format!("malformed extension {ext:?}")));
    }
    Ok(ext)
}

fn validate_scale(key: &str, scale: String) -> Result<String, ConfigError> {
    if !SCALE.is_match(&scale) {
        return Err(ConfigError::invalid(key, format!("malformed scale {scale:?}")));
    }
    Ok(scale)
}

fn validate_range(key: &str, value: u32, min: u32, max: u32) -> Result<u32, ConfigError> {
    if !(min..=max).contains(&value) {
        return Err(ConfigError::invalid(
            key,
            format!("{value} is not between {min} and {max}"),
        ));
    }
    Ok(value)
}

/// Image codecs the transcoder knows how to tune
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCodec {
    Mjpeg,
    LibaomAv1,
}

impl ImageCodec {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mjpeg => "mjpeg",
            Self::LibaomAv1 => "libaom-av1",
        }
    }
}

impl FromStr for ImageCodec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mjpeg" => Ok(Self::Mjpeg),
            "libaom-av1" => Ok(Self::LibaomAv1),
            other => Err(ConfigError::invalid(
                "image.codec",
                format!("{other:?} is not one of mjpeg, libaom-av1"),
            )),
        }
    }
}

impl fmt::Display for ImageCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSettings {
    pub extensions: Vec<String>,
    pub output_extension: String,
    pub scale: String,
    pub codec: ImageCodec,
    /// Only used by mjpeg
    pub qscale: u32,
    /// Only used by libaom-av1
    pub crf: u32,
    pub skip: bool,
}

impl ImageSettings {
    fn resolve(config: ImageConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            extensions: validate_extensions("image.extensions", config.extensions.unwrap_or_default())?,
            output_extension: validate_extension(
                "image.output_extension",
                config.output_extension.unwrap_or_default(),
            )?,
            scale: validate_scale("image.scale", config.scale.unwrap_or_default())?,
            codec: config.codec.unwrap_or_default().parse()?,
            qscale: validate_range("image.qscale", config.qscale.unwrap_or(5), 1, 31)?,
            crf: validate_range("image.crf", config.crf.unwrap_or(35), 0, 63)?,
            skip: config.skip.unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSettings {
    pub extensions: Vec<String>,
    pub output_extension: String,
    pub codec: String,
    pub qscale: u32,
    /// When set, used instead of qscale
    pub bitrate: Option<String>,
    pub skip: bool,
}

impl AudioSettings {
    pub const OPUS: &'static str = "libopus";

    fn resolve(config: AudioConfig) -> Result<Self, ConfigError> {
        let codec = config.codec.unwrap_or_default();
        let bitrate = match config.bitrate {
            Some(bitrate) => Some(bitrate).filter(|b| !b.is_empty()),
            None if codec == Self::OPUS => Some("32k".to_string()),
            None => None,
        };
        if codec == Self::OPUS && bitrate.is_none() {
            return Err(ConfigError::invalid(
                "audio.bitrate",
                format!("bit rate is required for audio codec {codec}"),
            ));
        }

        Ok(Self {
            extensions: validate_extensions("audio.extensions", config.extensions.unwrap_or_default())?,
            output_extension: validate_extension(
                "audio.output_extension",
                config.output_extension.unwrap_or_default(),
            )?,
            qscale: validate_range("audio.qscale", config.qscale.unwrap_or(5), 0, 9)?,
            codec,
            bitrate,
            skip: config.skip.unwrap_or(false),
        })
    }

    pub fn is_opus(&self) -> bool {
        self.codec == Self::OPUS
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSettings {
    pub extensions: Vec<String>,
    pub output_extension: String,
    pub scale: String,
    pub codec: String,
    pub preset: String,
    pub crf: u32,
    pub skip: bool,
}

impl VideoSettings {
    fn resolve(config: VideoConfig) -> Result<Self, ConfigError> {
        let codec = config.codec.unwrap_or_default();
        let preset = config.preset.unwrap_or_default();
        let valid_presets = match codec.to_lowercase().as_str() {
            "libsvtav1" => SVTAV1_PRESETS,
            "libx264" | "libx265" | "libaom-av1" => NAMED_PRESETS,
            _ => &[],
        };
        if !valid_presets.is_empty() && !valid_presets.contains(&preset.as_str()) {
            return Err(ConfigError::invalid(
                "video.preset",
                format!(
                    "{preset:?} is unknown for codec {codec}, expected one of {}",
                    valid_presets.join(", ")
                ),
            ));
        }

        Ok(Self {
            extensions: validate_extensions("video.extensions", config.extensions.unwrap_or_default())?,
            output_extension: validate_extension(
                "video.output_extension",
                config.output_extension.unwrap_or_default(),
            )?,
            scale: validate_scale("video.scale", config.scale.unwrap_or_default())?,
            crf: validate_range("video.crf", config.crf.unwrap_or(23), 0, 51)?,
            codec,
            preset,
            skip: config.skip.unwrap_or(false),
        })
    }
}

/// Fully resolved, validated settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub ffmpeg_path: Option<PathBuf>,
    pub ffmpeg_min_version: Version,
    pub override_output: bool,
    pub log_level: String,
    pub image: ImageSettings,
    pub audio: AudioSettings,
    pub video: VideoSettings,
}

impl Settings {
    pub fn media_extensions(&self) -> MediaExtensions {
        MediaExtensions {
            image: self.image.extensions.clone(),
            audio: self.audio.extensions.clone(),
            video: self.video.extensions.clone(),
        }
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Settings:")?;
        writeln!(f, "├── Input directory: {}", self.input_dir.display())?;
        writeln!(f, "├── Output directory: {}", self.output_dir.display())?;
        if let Some(path) = &self.ffmpeg_path {
            writeln!(f, "├── FFMPEG path: {}", path.display())?;
        }
        writeln!(f, "├── FFMPEG minimum version: {}", self.ffmpeg_min_version)?;
        writeln!(
            f,
            "├── Override existing output: {}",
            if self.override_output { "yes" } else { "no" }
        )?;

        if self.video.skip {
            writeln!(f, "├── Video files: skip")?;
        } else {
            let v = &self.video;
            writeln!(f, "├── Video files:")?;
            writeln!(f, "|   ├── Input file extensions: {}", v.extensions.join(", "))?;
            writeln!(f, "|   ├── Output file extension: {}", v.output_extension)?;
            writeln!(f, "|   ├── Scale: {}", v.scale)?;
            writeln!(f, "|   ├── Preset: {}", v.preset)?;
            writeln!(f, "|   ├── Codec: {}", v.codec)?;
            writeln!(f, "|   └── Constant rate factor: {}", v.crf)?;
        }

        if self.image.skip {
            writeln!(f, "├── Image files: skip")?;
        } else {
            let i = &self.image;
            writeln!(f, "├── Image files:")?;
            writeln!(f, "|   ├── Input file extensions: {}", i.extensions.join(", "))?;
            writeln!(f, "|   ├── Output file extension: {}", i.output_extension)?;
            writeln!(f, "|   ├── Scale: {}", i.scale)?;
            writeln!(f, "|   └── Codec: {}", i.codec)?;
            match i.codec {
                ImageCodec::Mjpeg => writeln!(f, "|       └── Constant quantizer qscale: {}", i.qscale)?,
                ImageCodec::LibaomAv1 => writeln!(f, "|       └── Constant quality CRF: {}", i.crf)?,
            }
        }

        if self.audio.skip {
            writeln!(f, "├── Audio files: skip")?;
        } else {
            let a = &self.audio;
            writeln!(f, "├── Audio files:")?;
            writeln!(f, "|   ├── Input file extensions: {}", a.extensions.join(", "))?;
            writeln!(f, "|   ├── Output file extension: {}", a.output_extension)?;
            writeln!(f, "|   ├── Codec: {}", a.codec)?;
            match &a.bitrate {
                Some(bitrate) => writeln!(f, "|   └── Bitrate: {bitrate}")?,
                None => writeln!(f, "|   └── Constant quantizer qscale: {}", a.qscale)?,
            }
        }

        write!(f, "└── Log level: {}", self.log_level)
    }
}
