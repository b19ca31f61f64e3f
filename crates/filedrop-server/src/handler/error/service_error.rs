//! Service error to HTTP error conversion implementation.

use super::http_error::{Error as HttpError, ErrorKind};
use crate::ErrorKind as ServiceErrorKind;

/// Tracing target for service error conversions.
const TRACING_TARGET: &str = "filedrop_server::handler::service";

impl From<crate::Error> for HttpError {
    fn from(error: crate::Error) -> Self {
        match error.kind() {
            ServiceErrorKind::InvalidInput => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Rejected upload input"
                );

                ErrorKind::BadRequest
                    .with_message("Invalid upload")
                    .with_context(error.message().to_owned())
            }
            ServiceErrorKind::FileSystem => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    source = ?std::error::Error::source(&error),
                    "Storage operation failed"
                );

                ErrorKind::InternalServerError
                    .with_message("Failed to store uploaded file")
                    .with_resource("upload")
            }
            ServiceErrorKind::Config => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Invalid storage configuration"
                );

                ErrorKind::InternalServerError.with_message("Storage is misconfigured")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::*;

    async fn rendered(error: HttpError) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let response = error.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, serde_json::from_slice(&body)?))
    }

    #[tokio::test]
    async fn invalid_input_maps_to_bad_request() -> anyhow::Result<()> {
        let error: HttpError = crate::Error::invalid_input("filename escapes").into();
        assert_eq!(error.kind(), ErrorKind::BadRequest);

        let (status, body) = rendered(error).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["context"], "filename escapes");
        Ok(())
    }

    #[tokio::test]
    async fn file_system_maps_to_internal_server_error() -> anyhow::Result<()> {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: HttpError = crate::Error::file_system("failed to create file: /srv/x")
            .with_source(source)
            .into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);

        let (status, body) = rendered(error).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["resource"], "upload");
        // Paths stay out of the client-facing response.
        assert!(body.get("context").is_none());
        Ok(())
    }
}
