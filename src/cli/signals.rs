//! Shutdown signal handling

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// How long a run may keep going after a shutdown request
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Turns SIGINT/SIGTERM into a cancelled token
pub struct ShutdownSignal {
    token: CancellationToken,
}

impl ShutdownSignal {
    /// Create a new shutdown signal handler
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Token cancelled once a signal arrives
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Setup signal handlers
    pub fn setup(&self) -> Result<(), std::io::Error> {
        #[cfg(unix)]
        let mut sigterm = {
            use tokio::signal::unix::{signal, SignalKind};
            signal(SignalKind::terminate())?
        };

        let token = self.token.clone();
        tokio::spawn(async move {
            #[cfg(unix)]
            let name = tokio::select! {
                _ = tokio::signal::ctrl_c() => "SIGINT",
                _ = sigterm.recv() => "SIGTERM",
            };
            #[cfg(not(unix))]
            let name = {
                let _ = tokio::signal::ctrl_c().await;
                "ctrl-c"
            };

            tracing::info!(signal = name, "shutdown requested");
            token.cancel();
        });

        Ok(())
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
