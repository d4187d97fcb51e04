//! Subprocess port interface

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Subprocess errors
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    #[error("Failed to start {program}: {message}")]
    Spawn { program: String, message: String },

    /// Non-zero exit; `output` is the combined stdout and stderr
    #[error("{program} exited with {status}: {output}")]
    Failed {
        program: String,
        status: String,
        output: String,
    },

    #[error("Command was cancelled")]
    Cancelled,
}

/// Port for running external programs to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` and collect its combined output.
    ///
    /// When `cancel` fires the child and everything it spawned are killed
    /// and `CommandError::Cancelled` is returned.
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<String, CommandError>;
}
