//! Middleware configuration for the HTTP server.
//!
//! Wraps the recovery settings re-exported from `filedrop-server` so they
//! can be set through CLI arguments or environment variables.

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use filedrop_server::middleware::RecoveryConfig;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Longest request timeout accepted, in seconds.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 3600;

/// Middleware configuration.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Recovery middleware configuration.
    ///
    /// Controls request timeout and panic recovery behavior.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Validates middleware settings.
    ///
    /// A configured request timeout must be between 1 and 3600 seconds.
    pub fn validate(&self) -> AnyhowResult<()> {
        if let Some(timeout) = self.recovery.request_timeout
            && (timeout == 0 || timeout > MAX_REQUEST_TIMEOUT_SECS)
        {
            return Err(anyhow!(
                "Request timeout {} seconds is invalid. Must be between 1 and {} seconds.",
                timeout,
                MAX_REQUEST_TIMEOUT_SECS
            ));
        }

        Ok(())
    }

    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            request_timeout_secs = ?self.recovery.request_timeout,
            "Recovery configuration"
        );
    }
}
