//! Upload form and multipart upload handlers.
//!
//! Outcomes the client caused (no file part, empty filename) are reported as
//! `200 OK` plain-text bodies; existing clients match on the exact text.

use std::io;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::response::Html;
use axum::routing::get;
use futures::TryStreamExt;
use tokio_util::io::StreamReader;

use crate::handler::{ErrorKind, Result};
use crate::service::{ServiceState, UploadStorage};

/// Tracing target for upload operations.
const TRACING_TARGET: &str = "filedrop_server::handler::uploads";

/// Name of the multipart part carrying the file.
pub const FILE_FIELD: &str = "file";

/// Body returned when the request has no file part.
pub const NO_FILE_PART: &str = "No file part";

/// Body returned when the file part has an empty filename.
pub const NO_SELECTED_FILE: &str = "No selected file";

/// Body returned after the file has been written.
pub const UPLOAD_SUCCEEDED: &str = "File successfully uploaded";

const UPLOAD_FORM: &str = r#"<!doctype html>
<title>Upload File</title>
<h1>Upload File</h1>
<form method=post enctype=multipart/form-data>
  <input type=file name=file>
  <input type=submit value=Upload>
</form>
"#;

/// Renders the upload form.
#[tracing::instrument(skip_all)]
async fn upload_form() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

/// Streams the `file` part of a multipart request into the upload directory.
///
/// Only the first part named `file` that carries a filename is stored; a
/// `file` part without a filename is an ordinary form field and is skipped
/// like any other part.
#[tracing::instrument(skip_all)]
async fn upload_file(
    State(storage): State<UploadStorage>,
    mut multipart: Multipart,
) -> Result<&'static str> {
    while let Some(field) = multipart.next_field().await.map_err(|err| {
        tracing::warn!(target: TRACING_TARGET, error = %err, "failed to read multipart field");
        ErrorKind::BadRequest
            .with_message("Invalid multipart data")
            .with_context(format!("Failed to parse multipart form: {}", err))
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let Some(filename) = field.file_name().map(ToOwned::to_owned) else {
            tracing::debug!(target: TRACING_TARGET, "skipping file field without filename");
            continue;
        };

        if filename.is_empty() {
            tracing::debug!(target: TRACING_TARGET, "file part has an empty filename");
            return Ok(NO_SELECTED_FILE);
        }

        tracing::debug!(target: TRACING_TARGET, filename = %filename, "streaming upload");

        let reader = StreamReader::new(field.map_err(io::Error::other));
        let bytes = storage.store(&filename, reader).await?;

        tracing::info!(
            target: TRACING_TARGET,
            filename = %filename,
            bytes = bytes,
            "file uploaded"
        );

        return Ok(UPLOAD_SUCCEEDED);
    }

    tracing::debug!(target: TRACING_TARGET, "request has no file part");
    Ok(NO_FILE_PART)
}

/// Returns a [`Router`] serving the upload form and the upload endpoint.
///
/// The request body limit is disabled: uploads of any size are accepted.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/", get(upload_form).post(upload_file))
        .layer(DefaultBodyLimit::disable())
}
