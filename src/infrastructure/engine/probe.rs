//! ffmpeg version probing

use std::path::Path;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{CommandError, CommandRunner};
use crate::domain::error::VersionError;
use crate::domain::version::Version;

/// Version probe errors
#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    #[error("getting version of {path}: {source}")]
    Command { path: String, source: CommandError },

    #[error("extracting version of {path}: {source}")]
    Version { path: String, source: VersionError },
}

impl ProbeError {
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Command {
                source: CommandError::Cancelled,
                ..
            }
        )
    }
}

/// Run `<binary> -version` and read the version off the banner's first line
pub async fn probe_version<R>(
    runner: &R,
    binary: &Path,
    cancel: &CancellationToken,
) -> Result<Version, ProbeError>
where
    R: CommandRunner + ?Sized,
{
    let path = binary.display().to_string();
    let output = runner
        .run(binary, &["-version".to_string()], cancel)
        .await
        .map_err(|source| ProbeError::Command {
            path: path.clone(),
            source,
        })?;

    let first_line = output.lines().next().unwrap_or_default();
    Version::extract(first_line).map_err(|source| ProbeError::Version { path, source })
}
