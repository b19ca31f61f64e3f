//! HTTPS server backed by rustls.

use std::net::SocketAddr;
use std::path::Path;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;

use crate::config::ServerConfig;
use crate::server::lifecycle::{log_failure, serve_with_shutdown};
use crate::server::{ServerError, ServerResult, ShutdownSignal};
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Starts an HTTPS server using the configured certificate and key.
///
/// The PEM files are checked and loaded before the listener is bound, so a
/// missing or unreadable certificate aborts startup.
pub async fn serve_https(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    let server_addr = server_config.server_addr();
    let shutdown_timeout = server_config.shutdown_timeout();

    let tls_config = match load_tls_config(&server_config).await {
        Ok(tls_config) => tls_config,
        Err(err) => {
            log_failure(&err, 0);
            return Err(err);
        }
    };

    let shutdown = ShutdownSignal::install();

    serve_with_shutdown(&server_config, move || async move {
        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            let reason = shutdown.recv().await;

            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                %reason,
                open_connections = shutdown_handle.connection_count(),
                timeout_secs = shutdown_timeout.as_secs(),
                "Draining in-flight uploads"
            );

            shutdown_handle.graceful_shutdown(Some(shutdown_timeout));
        });

        tracing::info!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            "HTTPS server listening"
        );

        axum_server::bind_rustls(server_addr, tls_config)
            .handle(handle)
            .serve(app.into_make_service_with_connect_info::<SocketAddr>())
            .await
    })
    .await
}

/// Validates and loads the PEM certificate and private key.
async fn load_tls_config(server_config: &ServerConfig) -> ServerResult<RustlsConfig> {
    let cert_path = server_config.tls_cert_path.as_path();
    let key_path = server_config.tls_key_path.as_path();

    validate_tls_files(cert_path, key_path)?;

    let tls_config = RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(|err| {
            ServerError::TlsCertificate(format!("Failed to load TLS certificates: {err}"))
        })?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        cert_path = %cert_path.display(),
        key_path = %key_path.display(),
        "TLS certificates loaded"
    );

    Ok(tls_config)
}

fn validate_tls_files(cert_path: &Path, key_path: &Path) -> ServerResult<()> {
    let validate_file = |path: &Path, file_type: &str| -> ServerResult<()> {
        let metadata = std::fs::metadata(path).map_err(|err| {
            ServerError::TlsCertificate(format!(
                "{} file does not exist or is unreadable: {} ({})",
                file_type,
                path.display(),
                err
            ))
        })?;

        if !metadata.is_file() {
            return Err(ServerError::TlsCertificate(format!(
                "{} path is not a file: {}",
                file_type,
                path.display()
            )));
        }

        if metadata.len() == 0 {
            return Err(ServerError::TlsCertificate(format!(
                "{} file is empty: {}",
                file_type,
                path.display()
            )));
        }

        Ok(())
    };

    validate_file(cert_path, "Certificate")?;
    validate_file(key_path, "Private key")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn rejects_missing_certificate() {
        let result = validate_tls_files(
            Path::new("missing_cert.pem"),
            Path::new("missing_key.pem"),
        );

        let Err(ServerError::TlsCertificate(msg)) = result else {
            panic!("expected TlsCertificate error");
        };
        assert!(msg.starts_with("Certificate file does not exist"));
    }

    #[test]
    fn rejects_empty_key() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let cert_path = dir.path().join("cert.pem");
        let key_path = dir.path().join("key.pem");
        std::fs::write(&cert_path, "-----BEGIN CERTIFICATE-----\n")?;
        std::fs::write(&key_path, "")?;

        let Err(ServerError::TlsCertificate(msg)) = validate_tls_files(&cert_path, &key_path)
        else {
            panic!("expected TlsCertificate error");
        };
        assert!(msg.starts_with("Private key file is empty"));
        Ok(())
    }

    #[test]
    fn rejects_directory_as_certificate() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let key_path = dir.path().join("key.pem");
        std::fs::write(&key_path, "key")?;

        let Err(ServerError::TlsCertificate(msg)) = validate_tls_files(dir.path(), &key_path)
        else {
            panic!("expected TlsCertificate error");
        };
        assert!(msg.starts_with("Certificate path is not a file"));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_pem_fails_to_load() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let config = ServerConfig {
            tls_cert_path: dir.path().join("cert.pem"),
            tls_key_path: dir.path().join("key.pem"),
            ..ServerConfig::default()
        };
        std::fs::write(&config.tls_cert_path, "not a certificate")?;
        std::fs::write(&config.tls_key_path, "not a key")?;

        let result = load_tls_config(&config).await;
        assert!(matches!(result, Err(ServerError::TlsCertificate(_))));
        Ok(())
    }
}
