//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - Observability: request IDs, tracing spans, sensitive header redaction
//! - Recovery: panics and (optional) request timeouts become JSON errors
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum::Router;
//! use filedrop_server::middleware::{RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt};
//!
//! let app: Router = Router::new()
//!     .with_observability()
//!     .with_recovery(&RecoveryConfig::default());
//! ```

mod observability;
mod recovery;

pub use observability::RouterObservabilityExt;
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
