//! ffmpeg acquisition use case

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::engine::{
    AcquiredEngine, EngineDownload, EngineSource, Platform, ENGINE_BINARY_NAMES, ENGINE_PATH_NAME,
};
use crate::domain::error::PlatformError;
use crate::domain::version::Version;
use crate::infrastructure::archive::{self, ArchiveError};
use crate::infrastructure::engine::{locator, probe_version, ProbeError};

use super::ports::{ArchiveDownloader, BinaryLookup, CommandRunner, DownloadError};

/// Errors from the acquire use case
#[derive(Debug, Clone, Error)]
pub enum AcquireError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("ffmpeg version {found} of {} is below minimum version {minimum}", .path.display())]
    VersionTooLow {
        path: PathBuf,
        found: Version,
        minimum: Version,
    },

    #[error("searching ffmpeg in {}: {message}", .dir.display())]
    CacheSearch { dir: PathBuf, message: String },

    #[error("emptying cache directory {}: {message}", .dir.display())]
    CacheReset { dir: PathBuf, message: String },

    #[error("downloading ffmpeg: {0}")]
    Download(#[from] DownloadError),

    #[error("extracting ffmpeg: {0}")]
    Extract(#[from] ArchiveError),

    #[error("ffmpeg binary not found in {}", .dir.display())]
    BinaryNotFound { dir: PathBuf },

    #[error("{}: {message}", .path.display())]
    Path { path: PathBuf, message: String },

    #[error("Acquiring ffmpeg was cancelled")]
    Cancelled,
}

/// Input parameters for the acquire use case
#[derive(Debug, Clone, Default)]
pub struct AcquireInput {
    /// Binary chosen by the user; empty or missing paths are skipped
    pub user_path: Option<PathBuf>,
    /// Lowest acceptable version for binaries already on the system
    pub min_version: Version,
}

/// Callbacks for progress and status updates
#[derive(Default)]
#[allow(clippy::type_complexity)]
pub struct AcquireCallbacks {
    /// Called when a stage fails softly and the next one is tried
    pub on_stage_failed: Option<Box<dyn Fn(EngineSource, &AcquireError) + Send + Sync>>,
    /// Called with the URL when the download starts
    pub on_download_start: Option<Box<dyn Fn(&str) + Send + Sync>>,
    /// Called when download and extraction are over, with their success
    pub on_download_end: Option<Box<dyn Fn(bool) + Send + Sync>>,
}

/// Finds a usable ffmpeg, downloading one as a last resort.
///
/// Sources are tried in order: user path, local cache, system PATH, download.
pub struct EngineAcquirer<R, L, D>
where
    R: CommandRunner,
    L: BinaryLookup,
    D: ArchiveDownloader,
{
    runner: R,
    lookup: L,
    downloader: D,
    cache_dir: PathBuf,
    platform: Platform,
}

impl<R, L, D> EngineAcquirer<R, L, D>
where
    R: CommandRunner,
    L: BinaryLookup,
    D: ArchiveDownloader,
{
    /// Create a new use case instance
    pub fn new(runner: R, lookup: L, downloader: D, cache_dir: PathBuf, platform: Platform) -> Self {
        Self {
            runner,
            lookup,
            downloader,
            cache_dir,
            platform,
        }
    }

    /// Run the acquisition stages until one yields a binary
    pub async fn execute(
        &self,
        input: AcquireInput,
        callbacks: AcquireCallbacks,
        cancel: &CancellationToken,
    ) -> Result<AcquiredEngine, AcquireError> {
        let minimum = input.min_version;

        if let Some(user_path) = input.user_path.filter(|p| !p.as_os_str().is_empty()) {
            let result = match tokio::fs::metadata(&user_path).await {
                Ok(_) => self
                    .gate(&user_path, &minimum, EngineSource::UserPath, cancel)
                    .await
                    .and_then(absolute),
                Err(e) => Err(AcquireError::Path {
                    path: user_path.clone(),
                    message: e.to_string(),
                }),
            };
            match result {
                Ok(engine) => return Ok(engine),
                Err(e) => soft_failure(EngineSource::UserPath, e, &callbacks, cancel)?,
            }
        }

        let cached = locator::search(&self.cache_dir, ENGINE_BINARY_NAMES).map_err(|e| {
            AcquireError::CacheSearch {
                dir: self.cache_dir.clone(),
                message: e.to_string(),
            }
        })?;
        if let Some(path) = cached {
            match self
                .gate(&path, &minimum, EngineSource::LocalCache, cancel)
                .await
            {
                Ok(engine) => return Ok(engine),
                Err(e) => soft_failure(EngineSource::LocalCache, e, &callbacks, cancel)?,
            }
        }

        if let Some(path) = self.lookup.find(ENGINE_PATH_NAME) {
            match self
                .gate(&path, &minimum, EngineSource::SystemPath, cancel)
                .await
            {
                Ok(engine) => return Ok(engine),
                Err(e) => soft_failure(EngineSource::SystemPath, e, &callbacks, cancel)?,
            }
        }

        self.download(&callbacks, cancel).await
    }

    /// Probe a candidate and check it against the minimum version
    async fn gate(
        &self,
        path: &Path,
        minimum: &Version,
        source: EngineSource,
        cancel: &CancellationToken,
    ) -> Result<AcquiredEngine, AcquireError> {
        let version = probe_version(&self.runner, path, cancel).await?;
        tracing::debug!(path = %path.display(), %version, %source, "probed ffmpeg");

        if version.is_before(minimum) {
            return Err(AcquireError::VersionTooLow {
                path: path.to_path_buf(),
                found: version,
                minimum: *minimum,
            });
        }

        Ok(AcquiredEngine {
            path: path.to_path_buf(),
            version,
            source,
        })
    }

    async fn download(
        &self,
        callbacks: &AcquireCallbacks,
        cancel: &CancellationToken,
    ) -> Result<AcquiredEngine, AcquireError> {
        let download = self.platform.resolve()?;
        if cancel.is_cancelled() {
            return Err(AcquireError::Cancelled);
        }

        empty_dir(&self.cache_dir)
            .await
            .map_err(|e| AcquireError::CacheReset {
                dir: self.cache_dir.clone(),
                message: e.to_string(),
            })?;

        if let Some(ref cb) = callbacks.on_download_start {
            cb(&download.url);
        }
        let result = tokio::select! {
            result = self.fetch_and_extract(&download) => result,
            _ = cancel.cancelled() => Err(AcquireError::Cancelled),
        };
        if let Some(ref cb) = callbacks.on_download_end {
            cb(result.is_ok());
        }
        result?;

        let path = locator::search(&self.cache_dir, ENGINE_BINARY_NAMES)
            .map_err(|e| AcquireError::CacheSearch {
                dir: self.cache_dir.clone(),
                message: e.to_string(),
            })?
            .ok_or_else(|| AcquireError::BinaryNotFound {
                dir: self.cache_dir.clone(),
            })?;

        make_executable(&path).await.map_err(|e| AcquireError::Path {
            path: path.clone(),
            message: format!("setting permissions: {e}"),
        })?;

        let version = probe_version(&self.runner, &path, cancel)
            .await
            .map_err(|e| {
                if e.is_cancelled() {
                    AcquireError::Cancelled
                } else {
                    AcquireError::Probe(e)
                }
            })?;

        absolute(AcquiredEngine {
            path,
            version,
            source: EngineSource::Download,
        })
    }

    async fn fetch_and_extract(&self, download: &EngineDownload) -> Result<(), AcquireError> {
        tracing::debug!(url = %download.url, format = %download.format, "downloading ffmpeg");
        let stream = self.downloader.fetch(&download.url).await?;
        archive::extract(stream, download.format, &self.cache_dir).await?;
        Ok(())
    }
}

/// Report a failed stage, unless the failure came from cancellation
fn soft_failure(
    source: EngineSource,
    error: AcquireError,
    callbacks: &AcquireCallbacks,
    cancel: &CancellationToken,
) -> Result<(), AcquireError> {
    let cancelled = matches!(&error, AcquireError::Probe(e) if e.is_cancelled());
    if cancelled || cancel.is_cancelled() {
        return Err(AcquireError::Cancelled);
    }

    tracing::debug!(%source, error = %error, "ffmpeg candidate rejected");
    if let Some(ref cb) = callbacks.on_stage_failed {
        cb(source, &error);
    }
    Ok(())
}

fn absolute(mut engine: AcquiredEngine) -> Result<AcquiredEngine, AcquireError> {
    engine.path = std::path::absolute(&engine.path).map_err(|e| AcquireError::Path {
        path: engine.path.clone(),
        message: format!("getting absolute path: {e}"),
    })?;
    Ok(engine)
}

async fn empty_dir(dir: &Path) -> io::Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    tokio::fs::create_dir_all(dir).await
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await
}

#[cfg(not(unix))]
async fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
