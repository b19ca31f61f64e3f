use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON body returned for every HTTP error.
///
/// ```json
/// { "name": "bad_request", "message": "Invalid multipart data", "context": "..." }
/// ```
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub name: &'static str,
    pub message: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Cow<'static, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Cow<'static, str>>,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ErrorResponse {
    /// Creates a response with no resource or context.
    pub fn new(
        name: &'static str,
        message: impl Into<Cow<'static, str>>,
        status: StatusCode,
    ) -> Self {
        Self {
            name,
            message: message.into(),
            resource: None,
            context: None,
            status,
        }
    }
}

impl IntoResponse for ErrorResponse {
    #[inline]
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[test]
    fn optional_fields_are_omitted() -> anyhow::Result<()> {
        let response = ErrorResponse::new("not_found", "No route", StatusCode::NOT_FOUND);
        let json = serde_json::to_value(&response)?;

        assert_eq!(json, serde_json::json!({ "name": "not_found", "message": "No route" }));
        Ok(())
    }

    #[tokio::test]
    async fn status_is_sent_but_not_serialized() -> anyhow::Result<()> {
        let mut response =
            ErrorResponse::new("bad_request", "Invalid upload", StatusCode::BAD_REQUEST);
        response.context = Some("filename escapes the upload directory".into());

        let response = response.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let json: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(json["context"], "filename escapes the upload directory");
        assert!(json.get("status").is_none());
        Ok(())
    }
}
