//! Main app runner

use std::fmt;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::application::ports::ConfigStore;
use crate::application::{
    AcquireCallbacks, AcquireError, AcquireInput, EngineAcquirer, FileError, FileOutcome,
    TinifyCallbacks, TinifyUseCase,
};
use crate::domain::config::{AppConfig, Settings};
use crate::domain::engine::{AcquiredEngine, EngineSource, Platform};
use crate::domain::error::ConfigError;
use crate::domain::media::{MediaFiles, MediaKind};
use crate::infrastructure::engine::default_cache_dir;
use crate::infrastructure::{
    FfmpegTranscoder, ReqwestDownloader, TokioCommandRunner, WhichLookup, XdgConfigStore,
};

use super::args::RunOptions;
use super::presenter::{kind_skipped_line, Presenter};
use super::signals::{ShutdownSignal, SHUTDOWN_GRACE};

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Build metadata stamped into the binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub commit: String,
    pub date: String,
}

impl BuildInfo {
    pub fn new(version: &str, commit: Option<&str>, date: Option<&str>) -> Self {
        Self {
            version: version.to_string(),
            commit: commit.unwrap_or("unknown").to_string(),
            date: date.unwrap_or("an unknown date").to_string(),
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "🤖 Version {} (commit {} built on {})",
            self.version, self.commit, self.date
        )
    }
}

/// Run a whole batch: settings, ffmpeg acquisition, then the media tree
pub async fn run(build: BuildInfo, options: RunOptions) -> ExitCode {
    let presenter = Arc::new(Presenter::new());
    presenter.status(&build.to_string());

    let store = XdgConfigStore::new();
    let settings = match load_settings(&store, options.to_config()).await {
        Ok(settings) => settings,
        Err(e) => {
            presenter.error(&format!("invalid settings: {e}"));
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };
    init_tracing(&settings.log_level);
    presenter.status(&settings.to_string());

    let shutdown = ShutdownSignal::new();
    if let Err(e) = shutdown.setup() {
        presenter.error(&format!("Failed to setup signal handler: {e}"));
        return ExitCode::from(EXIT_ERROR);
    }
    let cancel = shutdown.token();

    let work = run_batch(&settings, Arc::clone(&presenter), &cancel);
    tokio::pin!(work);

    tokio::select! {
        code = &mut work => code,
        _ = cancel.cancelled() => {
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut work).await {
                Ok(code) => code,
                Err(_) => {
                    presenter.stop_spinner();
                    presenter.error("Shutdown timed out");
                    ExitCode::from(EXIT_ERROR)
                }
            }
        }
    }
}

/// Load and merge configuration: defaults < file < environment and flags
pub async fn load_settings<S: ConfigStore>(
    store: &S,
    cli_config: AppConfig,
) -> Result<Settings, ConfigError> {
    let file_config = store.load_checked().await?;
    let settings = AppConfig::defaults()
        .merge(file_config)
        .merge(cli_config)
        .resolve()?;
    check_paths(&settings)?;
    Ok(settings)
}

/// Filesystem checks left out of `AppConfig::resolve`
fn check_paths(settings: &Settings) -> Result<(), ConfigError> {
    if !settings.input_dir.is_dir() {
        return Err(ConfigError::invalid(
            "input_dir",
            format!("directory {} does not exist", settings.input_dir.display()),
        ));
    }
    if let Some(path) = &settings.ffmpeg_path {
        if !path.exists() {
            return Err(ConfigError::invalid(
                "ffmpeg_path",
                format!("file {} does not exist", path.display()),
            ));
        }
    }
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tinier={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run_batch(
    settings: &Settings,
    presenter: Arc<Presenter>,
    cancel: &CancellationToken,
) -> ExitCode {
    let engine = match acquire_engine(settings, Arc::clone(&presenter), cancel).await {
        Ok(engine) => engine,
        Err(AcquireError::Cancelled) => {
            presenter.stop_spinner();
            presenter.info("Cancelled");
            return ExitCode::from(EXIT_SUCCESS);
        }
        Err(e) => {
            presenter.stop_spinner();
            presenter.error(&format!("failed to setup ffmpeg: {e}"));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if engine.version.is_before(&settings.ffmpeg_min_version) {
        presenter.warn(&format!(
            "downloaded ffmpeg version {} is below minimum version {}",
            engine.version, settings.ffmpeg_min_version
        ));
    }
    presenter.status(&format!(
        "✨ Using ffmpeg version {} at {}",
        engine.version,
        engine.path.display()
    ));

    let transcoder = FfmpegTranscoder::new(TokioCommandRunner::new(), engine.path);
    let use_case = TinifyUseCase::new(transcoder);
    let callbacks = tinify_callbacks(settings, &presenter);

    match use_case.execute(settings, callbacks, cancel).await {
        Ok(output) => {
            if let Some(summary) = output.stats.summary() {
                presenter.status(&summary);
            }
            if output.cancelled {
                presenter.info("Cancelled");
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn acquire_engine(
    settings: &Settings,
    presenter: Arc<Presenter>,
    cancel: &CancellationToken,
) -> Result<AcquiredEngine, AcquireError> {
    let cache_dir = default_cache_dir().ok_or_else(|| AcquireError::CacheSearch {
        dir: Path::new("~/.cache").join("tinier").join("ffmpeg"),
        message: "no user cache directory on this system".to_string(),
    })?;

    let acquirer = EngineAcquirer::new(
        TokioCommandRunner::new(),
        WhichLookup::new(),
        ReqwestDownloader::new(),
        cache_dir,
        Platform::current(),
    );

    presenter.status("🔦 Looking for ffmpeg...");

    let on_failed = Arc::clone(&presenter);
    let on_start = Arc::clone(&presenter);
    let on_end = Arc::clone(&presenter);
    let callbacks = AcquireCallbacks {
        on_stage_failed: Some(Box::new(move |source: EngineSource, e: &AcquireError| {
            on_failed.warn(&format!("{source}: {e}"));
        })),
        on_download_start: Some(Box::new(move |url: &str| {
            on_start.start_spinner(&format!("📥 Downloading ffmpeg from {url}"));
        })),
        on_download_end: Some(Box::new(move |ok: bool| {
            if ok {
                on_end.spinner_success("ffmpeg downloaded");
            } else {
                on_end.spinner_fail("ffmpeg download failed");
            }
        })),
    };

    let input = AcquireInput {
        user_path: settings.ffmpeg_path.clone(),
        min_version: settings.ffmpeg_min_version,
    };
    acquirer.execute(input, callbacks, cancel).await
}

fn tinify_callbacks(settings: &Settings, presenter: &Arc<Presenter>) -> TinifyCallbacks {
    let on_scanned = Arc::clone(presenter);
    let on_skipped = Arc::clone(presenter);
    let on_start = Arc::clone(presenter);
    let on_done = Arc::clone(presenter);
    let input_dir = settings.input_dir.display().to_string();

    TinifyCallbacks {
        on_scanned: Some(Box::new(move |files: &MediaFiles| {
            on_scanned.status(&format!(
                "📁 Read input directory {input_dir}: {} image(s), {} audio file(s), {} video(s) and {} other file(s) found",
                files.images.len(),
                files.audios.len(),
                files.videos.len(),
                files.others.len()
            ));
        })),
        on_kind_skipped: Some(Box::new(move |kind: MediaKind| {
            on_skipped.status(&kind_skipped_line(kind));
        })),
        on_file_start: Some(Box::new(move |kind: MediaKind, path: &Path| {
            on_start.file_started(kind, &path.display().to_string());
        })),
        on_file_done: Some(Box::new(move |kind: MediaKind, path: &Path, result: &Result<FileOutcome, FileError>| {
            on_done.file_done(kind, &path.display().to_string(), result);
        })),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::domain::config::{AudioConfig, VideoConfig};

    struct MemoryStore {
        config: Mutex<AppConfig>,
    }

    impl MemoryStore {
        fn new(config: AppConfig) -> Self {
            Self {
                config: Mutex::new(config),
            }
        }
    }

    #[async_trait]
    impl ConfigStore for MemoryStore {
        async fn load(&self) -> Result<AppConfig, ConfigError> {
            Ok(self.config.lock().unwrap().clone())
        }

        async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
            *self.config.lock().unwrap() = config.clone();
            Ok(())
        }

        fn path(&self) -> std::path::PathBuf {
            "memory.toml".into()
        }

        async fn init(&self) -> Result<(), ConfigError> {
            Ok(())
        }
    }

    fn with_input(dir: &TempDir) -> AppConfig {
        AppConfig {
            input_dir: Some(dir.path().to_path_buf()),
            ..AppConfig::empty()
        }
    }

    #[test]
    fn build_info_fills_unknowns() {
        let build = BuildInfo::new("1.2.3", None, None);
        assert_eq!(
            build.to_string(),
            "🤖 Version 1.2.3 (commit unknown built on an unknown date)"
        );

        let build = BuildInfo::new("1.2.3", Some("abc123"), Some("2024-01-01"));
        assert_eq!(build.commit, "abc123");
        assert_eq!(build.date, "2024-01-01");
    }

    #[tokio::test]
    async fn cli_layer_wins_over_file() {
        let dir = TempDir::new().unwrap();
        let file = AppConfig {
            video: Some(VideoConfig {
                crf: Some(30),
                preset: Some("4".to_string()),
                ..Default::default()
            }),
            ..with_input(&dir)
        };
        let cli = AppConfig {
            video: Some(VideoConfig {
                crf: Some(40),
                ..Default::default()
            }),
            ..AppConfig::empty()
        };

        let settings = load_settings(&MemoryStore::new(file), cli).await.unwrap();
        assert_eq!(settings.video.crf, 40);
        assert_eq!(settings.video.preset, "4");
        assert_eq!(settings.input_dir, dir.path());
    }

    #[tokio::test]
    async fn missing_input_dir_is_rejected() {
        let dir = TempDir::new().unwrap();
        let cli = AppConfig {
            input_dir: Some(dir.path().join("nope")),
            ..AppConfig::empty()
        };

        let err = load_settings(&MemoryStore::new(AppConfig::empty()), cli)
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref key, .. } if key == "input_dir"));
    }

    #[tokio::test]
    async fn missing_ffmpeg_path_is_rejected() {
        let dir = TempDir::new().unwrap();
        let cli = AppConfig {
            ffmpeg_path: Some(dir.path().join("ffmpeg")),
            ..with_input(&dir)
        };

        let err = load_settings(&MemoryStore::new(AppConfig::empty()), cli)
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref key, .. } if key == "ffmpeg_path"));
    }

    #[tokio::test]
    async fn invalid_file_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let file = AppConfig {
            audio: Some(AudioConfig {
                qscale: Some(12),
                ..Default::default()
            }),
            ..with_input(&dir)
        };

        let err = load_settings(&MemoryStore::new(file), AppConfig::empty())
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::InFile { ref path, .. } if path.ends_with("memory.toml")));
        assert!(err.to_string().contains("audio.qscale"));
    }
}
