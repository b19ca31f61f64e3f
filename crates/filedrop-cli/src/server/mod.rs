//! HTTP/HTTPS server startup and lifecycle management.
//!
//! The protocol is chosen at compile time: HTTPS with rustls when the `tls`
//! feature is enabled (the default), plain HTTP otherwise.

mod error;
#[cfg(not(feature = "tls"))]
mod http_server;
#[cfg(feature = "tls")]
mod https_server;
mod lifecycle;
mod shutdown;

use axum::Router;
pub use error::{ServerError, ServerResult};
#[cfg(not(feature = "tls"))]
use http_server::serve_http;
#[cfg(feature = "tls")]
use https_server::serve_https;
use shutdown::ShutdownSignal;

use crate::config::ServerConfig;

/// Starts a server with automatic protocol selection (HTTP/HTTPS).
///
/// # Errors
///
/// Returns an error if:
/// - TLS certificates cannot be loaded (HTTPS mode)
/// - Cannot bind to the specified address/port
/// - Server encounters a fatal error during operation
pub async fn serve(app: Router, config: ServerConfig) -> ServerResult<()> {
    #[cfg(feature = "tls")]
    {
        serve_https(app, config).await
    }

    #[cfg(not(feature = "tls"))]
    {
        serve_http(app, config).await
    }
}
