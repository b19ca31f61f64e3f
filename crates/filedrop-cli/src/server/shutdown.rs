//! Termination signal handling.
//!
//! Handlers are installed before the listener starts, so a signal that
//! arrives while the server is still binding is not lost.

use std::fmt;

use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// Signal that ended the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT or Ctrl+C.
    Interrupt,
    /// SIGTERM.
    Terminate,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("interrupt"),
            Self::Terminate => f.write_str("terminate"),
        }
    }
}

/// Installed termination handlers.
#[derive(Debug)]
pub struct ShutdownSignal {
    #[cfg(unix)]
    terminate: Option<Signal>,
}

impl ShutdownSignal {
    /// Registers the SIGTERM handler.
    ///
    /// Must be called from within a Tokio runtime. Failing to register is
    /// logged and leaves only Ctrl+C able to stop the server.
    pub fn install() -> Self {
        #[cfg(unix)]
        {
            let terminate = signal(SignalKind::terminate())
                .inspect_err(|err| {
                    tracing::error!(
                        target: TRACING_TARGET_SERVER_SHUTDOWN,
                        error = %err,
                        "Failed to install SIGTERM handler"
                    );
                })
                .ok();

            Self { terminate }
        }

        #[cfg(not(unix))]
        {
            Self {}
        }
    }

    /// Waits for the first termination signal.
    pub async fn recv(self) -> ShutdownReason {
        let reason = tokio::select! {
            () = interrupt() => ShutdownReason::Interrupt,
            () = self.terminate() => ShutdownReason::Terminate,
        };

        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            %reason,
            "Received shutdown signal"
        );

        reason
    }

    #[cfg(unix)]
    async fn terminate(self) {
        match self.terminate {
            Some(mut terminate) => {
                terminate.recv().await;
            }
            None => std::future::pending().await,
        }
    }

    #[cfg(not(unix))]
    async fn terminate(self) {
        std::future::pending().await
    }
}

async fn interrupt() {
    if let Err(err) = ctrl_c().await {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %err,
            "Failed to install Ctrl+C handler"
        );
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn sigterm_resolves_as_terminate() -> anyhow::Result<()> {
        let signal = ShutdownSignal::install();

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()?;
        assert!(status.success());

        let reason = timeout(Duration::from_secs(5), signal.recv()).await?;
        assert_eq!(reason, ShutdownReason::Terminate);
        Ok(())
    }

    #[test]
    fn reasons_display_as_signal_names() {
        assert_eq!(ShutdownReason::Interrupt.to_string(), "interrupt");
        assert_eq!(ShutdownReason::Terminate.to_string(), "terminate");
    }
}
