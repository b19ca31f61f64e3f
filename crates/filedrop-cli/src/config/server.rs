//! HTTP server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
#[cfg(feature = "tls")]
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// HTTP server configuration.
///
/// # Environment Variables
///
/// - `HOST` - Server host address (default: 0.0.0.0)
/// - `PORT` - Server port (default: 5555)
/// - `SHUTDOWN_TIMEOUT` - Graceful shutdown timeout in seconds (default: 30, max: 300)
/// - `TLS_CERT_PATH` - PEM certificate (default: cert.pem, `tls` feature)
/// - `TLS_KEY_PATH` - PEM private key (default: key.pem, `tls` feature)
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Host address to bind the server to.
    ///
    /// Use "127.0.0.1" for localhost only, "0.0.0.0" for all interfaces.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// TCP port number for the server to listen on.
    #[arg(short = 'p', long, env = "PORT", default_value_t = 5555)]
    pub port: u16,

    /// Maximum time in seconds to wait for graceful shutdown.
    ///
    /// During shutdown, the server will stop accepting new connections and wait
    /// up to this duration for in-flight uploads to complete before forcefully
    /// terminating them. Valid range: 1-300 seconds.
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 30)]
    pub shutdown_timeout: u64,

    /// Path to TLS certificate file (PEM format).
    #[cfg(feature = "tls")]
    #[arg(long, env = "TLS_CERT_PATH", default_value = "cert.pem")]
    pub tls_cert_path: PathBuf,

    /// Path to TLS private key file (PEM format).
    #[cfg(feature = "tls")]
    #[arg(long, env = "TLS_KEY_PATH", default_value = "key.pem")]
    pub tls_key_path: PathBuf,
}

/// Default host address: all interfaces.
fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

impl ServerConfig {
    /// Validates all configuration values and returns errors for invalid settings.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Port is 0
    /// - Shutdown timeout is outside 1-300 seconds
    /// - A TLS path is empty (when TLS is enabled)
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.port == 0 {
            return Err(anyhow!("Port 0 is invalid. Use a port between 1 and 65535."));
        }

        if self.shutdown_timeout == 0 || self.shutdown_timeout > 300 {
            return Err(anyhow!(
                "Shutdown timeout {} seconds is invalid. Must be between 1 and 300 seconds.",
                self.shutdown_timeout
            ));
        }

        #[cfg(feature = "tls")]
        {
            if self.tls_cert_path.as_os_str().is_empty() || self.tls_key_path.as_os_str().is_empty()
            {
                return Err(anyhow!(
                    "Both TLS certificate and key paths must be provided"
                ));
            }
        }

        Ok(())
    }

    /// Returns the complete socket address for server binding.
    #[must_use]
    pub const fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the graceful shutdown timeout as a `Duration`.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// Returns whether the server is configured to bind to all interfaces.
    ///
    /// This is true when the host is set to "0.0.0.0" (IPv4) or "::" (IPv6).
    #[must_use]
    pub const fn binds_to_all_interfaces(&self) -> bool {
        match self.host {
            IpAddr::V4(addr) => addr.is_unspecified(),
            IpAddr::V6(addr) => addr.is_unspecified(),
        }
    }

    /// Returns whether connections are served over TLS.
    #[must_use]
    pub const fn is_tls_enabled(&self) -> bool {
        cfg!(feature = "tls")
    }

    /// Logs server configuration details.
    pub fn log(&self) {
        #[cfg(feature = "tls")]
        {
            tracing::info!(
                target: TRACING_TARGET_CONFIG,
                host = %self.host,
                port = self.port,
                tls_enabled = self.is_tls_enabled(),
                cert_path = %self.tls_cert_path.display(),
                key_path = %self.tls_key_path.display(),
                "Server configured successfully"
            );
        }

        #[cfg(not(feature = "tls"))]
        {
            tracing::info!(
                target: TRACING_TARGET_CONFIG,
                host = %self.host,
                port = self.port,
                tls_enabled = self.is_tls_enabled(),
                "Server configured successfully"
            );
        }
    }
}

impl Default for ServerConfig {
    /// Matches the command-line defaults.
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 5555,
            shutdown_timeout: 30,
            #[cfg(feature = "tls")]
            tls_cert_path: PathBuf::from("cert.pem"),
            #[cfg(feature = "tls")]
            tls_key_path: PathBuf::from("key.pem"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.binds_to_all_interfaces());
    }

    #[test]
    fn reject_zero_port() {
        let mut config = ServerConfig::default();
        config.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_invalid_shutdown_timeouts() {
        let mut config = ServerConfig::default();

        config.shutdown_timeout = 0;
        assert!(config.validate().is_err());

        config.shutdown_timeout = 301;
        assert!(config.validate().is_err());

        config.shutdown_timeout = 60;
        assert!(config.validate().is_ok());
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn server_addr_returns_correct_socket() {
        let config = ServerConfig::default();
        let addr = config.server_addr();
        assert_eq!(addr.ip(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(addr.port(), 5555);
    }

    #[test]
    fn loopback_does_not_bind_all_interfaces() {
        let config = ServerConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            ..ServerConfig::default()
        };
        assert!(!config.binds_to_all_interfaces());
    }

    #[cfg(feature = "tls")]
    #[test]
    fn reject_empty_tls_paths() {
        let config = ServerConfig {
            tls_key_path: PathBuf::new(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
