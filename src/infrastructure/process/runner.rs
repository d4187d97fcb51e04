//! tokio-based command runner with process group cleanup

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{CommandError, CommandRunner};

/// Runs programs as tokio child processes.
///
/// On Unix each child leads its own process group, so cancelling also
/// reaches anything the child spawned.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<String, CommandError> {
        let name = program.display().to_string();
        if cancel.is_cancelled() {
            return Err(CommandError::Cancelled);
        }

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        own_process_group(&mut command);

        let mut child = command.spawn().map_err(|e| CommandError::Spawn {
            program: name.clone(),
            message: e.to_string(),
        })?;

        // The group outlives its leader, so keep the id past `wait`
        let group = child.id();
        let stdout = tokio::spawn(read_pipe(child.stdout.take()));
        let stderr = tokio::spawn(read_pipe(child.stderr.take()));

        let status = tokio::select! {
            status = child.wait() => status.map_err(|e| CommandError::Spawn {
                program: name.clone(),
                message: e.to_string(),
            })?,
            _ = cancel.cancelled() => {
                tracing::debug!(program = %name, "cancelled, killing process group");
                kill_process_tree(&mut child);
                let _ = child.wait().await;
                return Err(CommandError::Cancelled);
            }
        };

        // Leftover descendants may still hold the pipes open
        let drained = async {
            let mut output = stdout.await.unwrap_or_default();
            output.push_str(&stderr.await.unwrap_or_default());
            output
        };
        let output = tokio::select! {
            output = drained => output,
            _ = cancel.cancelled() => {
                tracing::debug!(program = %name, "cancelled while draining output, killing process group");
                kill_group(group);
                return Err(CommandError::Cancelled);
            }
        };

        if status.success() {
            Ok(output)
        } else {
            Err(CommandError::Failed {
                program: name,
                status: status.to_string(),
                output: output.trim_end().to_string(),
            })
        }
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> String {
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        // A broken pipe only truncates the diagnostics
        let _ = pipe.read_to_end(&mut buffer).await;
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(unix)]
fn own_process_group(command: &mut Command) {
    command.process_group(0);
}

#[cfg(not(unix))]
fn own_process_group(_command: &mut Command) {}

/// Kill a child and the process group it leads
fn kill_process_tree(child: &mut Child) {
    kill_group(child.id());
    let _ = child.start_kill();
}

#[cfg(unix)]
fn kill_group(group: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Some(id) = group {
        if let Err(e) = killpg(Pid::from_raw(id as i32), Signal::SIGKILL) {
            tracing::debug!(pgid = id, error = %e, "killpg failed");
        }
    }
}

#[cfg(not(unix))]
fn kill_group(_group: Option<u32>) {}
