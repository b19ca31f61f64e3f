//! Plain HTTP server, used when the `tls` feature is disabled.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::server::lifecycle::{log_failure, serve_with_shutdown};
use crate::server::{ServerError, ServerResult, ShutdownSignal};
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Starts an HTTP server with graceful shutdown.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
/// while running.
pub async fn serve_http(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    let server_addr = server_config.server_addr();
    let shutdown = ShutdownSignal::install();

    let listener = match TcpListener::bind(server_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            let err = ServerError::bind_error(&server_addr.to_string(), err);
            log_failure(&err, 0);
            return Err(err);
        }
    };

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_addr,
        "HTTP server listening"
    );

    // axum::serve has no drain deadline: in-flight uploads run to completion.
    let shutdown_signal = async move {
        let reason = shutdown.recv().await;
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            %reason,
            "Draining in-flight uploads"
        );
    };

    serve_with_shutdown(&server_config, || async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
    })
    .await
}
