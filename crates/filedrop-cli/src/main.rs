#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use filedrop_server::handler::routes;
use filedrop_server::middleware::{RouterObservabilityExt, RouterRecoveryExt};
use filedrop_server::service::{ServiceState, StorageConfig};

use crate::config::{Cli, MiddlewareConfig};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "filedrop_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "filedrop_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "filedrop_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = ?error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();
    cli.validate().context("invalid configuration")?;

    let state = create_service_state(&cli.storage).await?;
    let router = create_router(state, &cli.middleware);

    server::serve(router, cli.server).await?;

    Ok(())
}

/// Creates the service state, including the upload directory.
async fn create_service_state(config: &StorageConfig) -> anyhow::Result<ServiceState> {
    ServiceState::from_config(config.clone())
        .await
        .context("failed to initialize upload storage")
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces optional timeouts
/// 2. Observability - request IDs and tracing spans
/// 3. Routes (innermost) - upload form and upload handler
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes()
        .with_state(state)
        .with_observability()
        .with_recovery(&middleware.recovery)
}
