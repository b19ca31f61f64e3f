//! Server error types with context and recovery suggestions.

use std::io;

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Error type for server startup and runtime failures.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address.
    #[cfg_attr(feature = "tls", allow(dead_code))]
    #[error("Failed to bind to {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Runtime server error.
    #[error("Runtime error: {0}")]
    Runtime(#[source] io::Error),

    /// TLS certificate or key could not be loaded.
    #[cfg_attr(not(feature = "tls"), allow(dead_code))]
    #[error("TLS certificate error: {0}")]
    TlsCertificate(String),
}

impl ServerError {
    /// Creates a bind error with address context.
    #[cfg_attr(feature = "tls", allow(dead_code))]
    pub fn bind_error(address: &str, source: io::Error) -> Self {
        Self::BindError {
            address: address.to_string(),
            source,
        }
    }

    /// Returns a unique error code for this error type.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BindError { .. } => "E001",
            Self::Runtime(_) => "E002",
            Self::TlsCertificate(_) => "E003",
        }
    }

    /// Determines if this error is potentially recoverable.
    ///
    /// Recoverable errors are those that might succeed if retried or
    /// if the environment changes (e.g., different port, wait for resource).
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::TlsCertificate(_) => false,
            Self::BindError { source, .. } | Self::Runtime(source) => matches!(
                source.kind(),
                io::ErrorKind::PermissionDenied
                    | io::ErrorKind::AddrInUse
                    | io::ErrorKind::AddrNotAvailable
                    | io::ErrorKind::Interrupted
                    | io::ErrorKind::TimedOut
            ),
        }
    }

    /// Provides a human-readable suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::BindError { source, .. } | Self::Runtime(source) => match source.kind() {
                io::ErrorKind::PermissionDenied => {
                    Some("Try using a port above 1024 or run with appropriate privileges")
                }
                io::ErrorKind::AddrInUse => Some(
                    "The port is already in use. Try a different port or stop the conflicting service",
                ),
                io::ErrorKind::AddrNotAvailable => {
                    Some("The address is not available. Check network interface configuration")
                }
                _ => None,
            },
            Self::TlsCertificate(_) => Some(
                "Check that --tls-cert-path and --tls-key-path point to valid PEM files",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_unique() {
        let errors = [
            ServerError::bind_error("0.0.0.0:5555", io::Error::other("test")),
            ServerError::Runtime(io::Error::other("test")),
            ServerError::TlsCertificate("test".to_string()),
        ];

        let codes: Vec<_> = errors.iter().map(ServerError::error_code).collect();
        for i in 0..codes.len() {
            for j in i + 1..codes.len() {
                assert_ne!(codes[i], codes[j], "Error codes must be unique");
            }
        }
    }

    #[test]
    fn address_in_use_is_recoverable() {
        let error = ServerError::bind_error(
            "0.0.0.0:5555",
            io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        );

        assert!(error.is_recoverable());
        assert!(error.suggestion().is_some());
        assert!(error.to_string().contains("0.0.0.0:5555"));
    }

    #[test]
    fn tls_errors_are_fatal_but_explained() {
        let error = ServerError::TlsCertificate("Certificate file does not exist".to_string());

        assert!(!error.is_recoverable());
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn unrelated_runtime_errors_have_no_suggestion() {
        let error = ServerError::Runtime(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert_eq!(error.suggestion(), None);

        let error = ServerError::Runtime(io::Error::new(io::ErrorKind::InvalidData, "bad"));
        assert_eq!(error.suggestion(), None);
    }
}
