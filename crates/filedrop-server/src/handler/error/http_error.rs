//! HTTP errors returned by handlers and middleware.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;

/// Error returned by a handler, rendered as an [`ErrorResponse`].
///
/// The [`ErrorKind`] fixes the status code and name; the message replaces
/// the kind's default message when set.
#[derive(Debug, Clone, Default)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error {
    kind: ErrorKind,
    message: Option<Cow<'static, str>>,
    resource: Option<Cow<'static, str>>,
    context: Option<Cow<'static, str>>,
}

impl Error {
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    #[inline]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Names what the failing request was operating on.
    #[inline]
    pub fn with_resource(mut self, resource: impl Into<Cow<'static, str>>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Adds detail returned to the client alongside the message.
    #[inline]
    pub fn with_context(mut self, context: impl Into<Cow<'static, str>>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.kind.default_message())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {}",
            self.kind,
            self.kind.status_code().as_u16(),
            self.message()
        )?;

        if let Some(context) = &self.context {
            write!(f, " - {context}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let kind = self.kind;
        let message = self
            .message
            .unwrap_or(Cow::Borrowed(kind.default_message()));

        ErrorResponse {
            resource: self.resource,
            context: self.context,
            ..ErrorResponse::new(kind.name(), message, kind.status_code())
        }
        .into_response()
    }
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result returned by fallible handlers.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// HTTP error kinds the upload service can produce.
#[must_use = "error kinds do nothing unless used to create errors"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed multipart body or rejected filename.
    BadRequest,
    /// No route for the requested path.
    NotFound,
    /// Storage failure, panic or timeout.
    #[default]
    InternalServerError,
}

impl ErrorKind {
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'static, str>>) -> Error {
        Error::new(self).with_message(message)
    }

    #[inline]
    pub fn with_context(self, context: impl Into<Cow<'static, str>>) -> Error {
        Error::new(self).with_context(context)
    }

    /// Returns the `name` field of the JSON error body.
    pub const fn name(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::InternalServerError => "internal_server_error",
        }
    }

    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message used when the error carries none of its own.
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::BadRequest => "The request could not be processed due to invalid data",
            Self::NotFound => "The requested resource was not found",
            Self::InternalServerError => {
                "An internal server error occurred. Please try again later"
            }
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        Error::new(self).into_response()
    }
}
