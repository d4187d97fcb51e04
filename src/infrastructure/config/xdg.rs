//! Settings file under the user config directory

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

const FILE_HEADER: &str = "\
# tinier settings
# TINIER_* environment variables and command line flags override these.

";

/// TOML settings file, `$XDG_CONFIG_HOME/tinier/config.toml` by default
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    pub fn new() -> Self {
        let dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("tinier");

        Self {
            path: dir.join("config.toml"),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse(&self, content: &str) -> Result<AppConfig, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: self.path.clone(),
            message: e.message().to_string(),
        })
    }

    fn render(&self, config: &AppConfig) -> Result<String, ConfigError> {
        let body = toml::to_string_pretty(config).map_err(|e| self.write_error(e))?;
        Ok(format!("{FILE_HEADER}{body}"))
    }

    fn write_error(&self, e: impl ToString) -> ConfigError {
        ConfigError::Write {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }

    /// Sibling used to swap the file in whole
    fn staging_path(&self) -> PathBuf {
        self.path.with_extension("toml.tmp")
    }
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AppConfig::empty()),
            Err(e) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    message: e.to_string(),
                })
            }
        };

        self.parse(&content)
    }

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.write_error(e))?;
        }

        let content = self.render(config)?;
        let staging = self.staging_path();
        fs::write(&staging, content)
            .await
            .map_err(|e| self.write_error(e))?;
        if let Err(e) = fs::rename(&staging, &self.path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(self.write_error(e));
        }

        tracing::debug!(path = %self.path.display(), "settings file saved");
        Ok(())
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    async fn init(&self) -> Result<(), ConfigError> {
        if fs::try_exists(&self.path).await.unwrap_or(false) {
            return Err(ConfigError::AlreadyExists(self.path.clone()));
        }

        self.save(&AppConfig::defaults()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{AudioConfig, VideoConfig};

    fn store_in(dir: &tempfile::TempDir) -> XdgConfigStore {
        XdgConfigStore::with_path(dir.path().join("tinier/config.toml"))
    }

    #[test]
    fn default_path_is_under_the_config_dir() {
        let path = XdgConfigStore::new().path();
        assert!(path.to_string_lossy().contains("tinier"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn parses_sections() {
        let store = XdgConfigStore::with_path("/unused/config.toml");
        let content = r#"
input_dir = "/media/phone"
ffmpeg_min_version = "6.0"
override_output = true

[video]
codec = "libx265"
preset = "slow"
crf = 28

[audio]
skip = true
"#;

        let config = store.parse(content).unwrap();
        assert_eq!(config.input_dir, Some(PathBuf::from("/media/phone")));
        assert_eq!(config.ffmpeg_min_version, Some("6.0".to_string()));
        assert_eq!(config.override_output, Some(true));
        let video = config.video.unwrap();
        assert_eq!(video.codec, Some("libx265".to_string()));
        assert_eq!(video.crf, Some(28));
        assert_eq!(config.audio.unwrap().skip, Some(true));
        assert!(config.image.is_none());
    }

    #[tokio::test]
    async fn parse_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(dir.path().join("tinier")).unwrap();
        std::fs::write(store.path(), "override_output = \"yes\"\n").unwrap();

        let err = store.load().await.unwrap_err();
        match &err {
            ConfigError::Parse { path, .. } => assert_eq!(path, &store.path()),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("config.toml"));
    }

    #[tokio::test]
    async fn init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.load().await.unwrap(), AppConfig::empty());
        store.init().await.unwrap();
        assert_eq!(store.load().await.unwrap(), AppConfig::defaults());

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.starts_with("# tinier settings"));
        assert!(!store.staging_path().exists());

        let err = store.init().await.unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(ref p) if p == &store.path()));
    }

    #[tokio::test]
    async fn save_replaces_the_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.init().await.unwrap();

        let overlay = AppConfig {
            video: Some(VideoConfig {
                crf: Some(30),
                ..Default::default()
            }),
            ..AppConfig::empty()
        };
        store.save(&overlay).await.unwrap();

        assert_eq!(store.load().await.unwrap(), overlay);
        assert!(!store.staging_path().exists());
    }

    #[tokio::test]
    async fn checked_load_rejects_out_of_range_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let overlay = AppConfig {
            audio: Some(AudioConfig {
                qscale: Some(12),
                ..Default::default()
            }),
            ..AppConfig::empty()
        };
        store.save(&overlay).await.unwrap();

        // Plain loads still work so the value can be inspected and fixed
        assert_eq!(store.load().await.unwrap(), overlay);

        let err = store.load_checked().await.unwrap_err();
        match err {
            ConfigError::InFile { path, source } => {
                assert_eq!(path, store.path());
                assert!(
                    matches!(*source, ConfigError::ValidationError { ref key, .. } if key == "audio.qscale")
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
