//! Server lifecycle management.

use std::future::Future;
use std::io;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::server::{ServerError, ServerResult};
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Serves with lifecycle logging and converts runtime failures into [`ServerError`].
pub async fn serve_with_shutdown<F>(
    server_config: &ServerConfig,
    serve_fn: impl FnOnce() -> F,
) -> ServerResult<()>
where
    F: Future<Output = io::Result<()>>,
{
    let start_time = Instant::now();

    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Server bound to all interfaces, uploads are reachable from the network"
        );
    }

    tracing::debug!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_config.server_addr(),
        shutdown_timeout = server_config.shutdown_timeout,
        tls = server_config.is_tls_enabled(),
        "Server configuration"
    );

    let result = serve_fn().await.map_err(ServerError::Runtime);
    let uptime_secs = start_time.elapsed().as_secs();

    match &result {
        Ok(()) => {
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                uptime_secs,
                "Shutdown completed"
            );
        }
        Err(err) => log_failure(err, uptime_secs),
    }

    result
}

/// Logs a fatal server error with its code and recovery suggestion.
pub fn log_failure(err: &ServerError, uptime_secs: u64) {
    tracing::error!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        error = %err,
        code = err.error_code(),
        recoverable = err.is_recoverable(),
        uptime_secs,
        "Fatal error"
    );

    if let Some(suggestion) = err.suggestion() {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            suggestion,
            "Recovery suggestion"
        );
    }
}
