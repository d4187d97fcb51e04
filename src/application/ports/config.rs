//! Settings file port

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// The settings file, the layer between the defaults and the environment.
///
/// It stores a partial `AppConfig`: keys left out fall through to the
/// defaults, and env vars and flags override whatever it holds.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read the stored overlay. A missing file is an empty overlay.
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Replace the stored overlay
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    /// Location of the file
    fn path(&self) -> PathBuf;

    /// Write the defaults. Fails if the file is already there.
    async fn init(&self) -> Result<(), ConfigError>;

    /// Check an overlay resolves over the defaults on its own.
    ///
    /// Failures are tagged with the file path, so `config set` and a run
    /// report a bad value the same way.
    fn check(&self, config: &AppConfig) -> Result<(), ConfigError> {
        config
            .clone()
            .resolve()
            .map(drop)
            .map_err(|e| ConfigError::in_file(self.path(), e))
    }

    /// Read the stored overlay and `check` it
    async fn load_checked(&self) -> Result<AppConfig, ConfigError> {
        let config = self.load().await?;
        self.check(&config)?;
        Ok(config)
    }
}
