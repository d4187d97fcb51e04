//! Config command handler

use std::path::PathBuf;
use std::str::FromStr;

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, AudioConfig, ImageConfig, VideoConfig};
use crate::domain::error::ConfigError;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let mut config = store.load().await?;
    set_value(&mut config, key, value)?;
    store.check(&config)?;

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    match get_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }

    Ok(())
}

/// List the values a run would start from: defaults overlaid with the file
async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = AppConfig::defaults().merge(store.load().await?);

    for key in VALID_CONFIG_KEYS {
        let value = get_value(&config, key);
        presenter.key_value(key, value.as_deref().unwrap_or(NOT_SET));
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::invalid(
        key,
        format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    ))
}

/// Read one dotted key out of a config
fn get_value(config: &AppConfig, key: &str) -> Option<String> {
    let image = config.image.as_ref();
    let audio = config.audio.as_ref();
    let video = config.video.as_ref();

    match key {
        "input_dir" => config.input_dir.as_ref().map(|p| p.display().to_string()),
        "output_dir" => config.output_dir.as_ref().map(|p| p.display().to_string()),
        "ffmpeg_path" => config.ffmpeg_path.as_ref().map(|p| p.display().to_string()),
        "ffmpeg_min_version" => config.ffmpeg_min_version.clone(),
        "override_output" => config.override_output.map(|b| b.to_string()),
        "log_level" => config.log_level.clone(),

        "image.extensions" => image.and_then(|s| s.extensions.as_ref()).map(|v| v.join(",")),
        "image.output_extension" => image.and_then(|s| s.output_extension.clone()),
        "image.scale" => image.and_then(|s| s.scale.clone()),
        "image.codec" => image.and_then(|s| s.codec.clone()),
        "image.qscale" => image.and_then(|s| s.qscale).map(|n| n.to_string()),
        "image.crf" => image.and_then(|s| s.crf).map(|n| n.to_string()),
        "image.skip" => image.and_then(|s| s.skip).map(|b| b.to_string()),

        "audio.extensions" => audio.and_then(|s| s.extensions.as_ref()).map(|v| v.join(",")),
        "audio.output_extension" => audio.and_then(|s| s.output_extension.clone()),
        "audio.codec" => audio.and_then(|s| s.codec.clone()),
        "audio.qscale" => audio.and_then(|s| s.qscale).map(|n| n.to_string()),
        "audio.bitrate" => audio.and_then(|s| s.bitrate.clone()),
        "audio.skip" => audio.and_then(|s| s.skip).map(|b| b.to_string()),

        "video.extensions" => video.and_then(|s| s.extensions.as_ref()).map(|v| v.join(",")),
        "video.output_extension" => video.and_then(|s| s.output_extension.clone()),
        "video.scale" => video.and_then(|s| s.scale.clone()),
        "video.codec" => video.and_then(|s| s.codec.clone()),
        "video.preset" => video.and_then(|s| s.preset.clone()),
        "video.crf" => video.and_then(|s| s.crf).map(|n| n.to_string()),
        "video.skip" => video.and_then(|s| s.skip).map(|b| b.to_string()),

        _ => None,
    }
}

/// Write one dotted key into a config, parsing the value for its type
fn set_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let text = || Some(value.to_string());

    match key {
        "input_dir" => config.input_dir = Some(PathBuf::from(value)),
        "output_dir" => config.output_dir = Some(PathBuf::from(value)),
        "ffmpeg_path" => config.ffmpeg_path = Some(PathBuf::from(value)),
        "ffmpeg_min_version" => config.ffmpeg_min_version = text(),
        "override_output" => config.override_output = Some(parse_bool(key, value)?),
        "log_level" => config.log_level = text(),

        "image.extensions" => image(config).extensions = Some(parse_list(value)),
        "image.output_extension" => image(config).output_extension = text(),
        "image.scale" => image(config).scale = text(),
        "image.codec" => image(config).codec = text(),
        "image.qscale" => image(config).qscale = Some(parse_number(key, value)?),
        "image.crf" => image(config).crf = Some(parse_number(key, value)?),
        "image.skip" => image(config).skip = Some(parse_bool(key, value)?),

        "audio.extensions" => audio(config).extensions = Some(parse_list(value)),
        "audio.output_extension" => audio(config).output_extension = text(),
        "audio.codec" => audio(config).codec = text(),
        "audio.qscale" => audio(config).qscale = Some(parse_number(key, value)?),
        "audio.bitrate" => audio(config).bitrate = text(),
        "audio.skip" => audio(config).skip = Some(parse_bool(key, value)?),

        "video.extensions" => video(config).extensions = Some(parse_list(value)),
        "video.output_extension" => video(config).output_extension = text(),
        "video.scale" => video(config).scale = text(),
        "video.codec" => video(config).codec = text(),
        "video.preset" => video(config).preset = text(),
        "video.crf" => video(config).crf = Some(parse_number(key, value)?),
        "video.skip" => video(config).skip = Some(parse_bool(key, value)?),

        _ => return check_key(key),
    }

    Ok(())
}

fn image(config: &mut AppConfig) -> &mut ImageConfig {
    config.image.get_or_insert_with(Default::default)
}

fn audio(config: &mut AppConfig) -> &mut AudioConfig {
    config.audio.get_or_insert_with(Default::default)
}

fn video(config: &mut AppConfig) -> &mut VideoConfig {
    config.video.get_or_insert_with(Default::default)
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(key, format!("'{value}' is not a whole number")))
}

/// Parse a boolean value
fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::invalid(key, "Value must be 'true' or 'false'")),
    }
}
