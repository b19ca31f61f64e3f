//! Application state and dependency injection.

mod config;
mod storage;

pub use crate::service::config::{StorageConfig, StorageConfigBuilder, StorageConfigBuilderError};
pub use crate::service::storage::{CHUNK_SIZE, UploadStorage};
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    pub storage: UploadStorage,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Creates the upload directory if it does not exist yet.
    pub async fn from_config(storage_config: StorageConfig) -> Result<Self> {
        let service_state = Self {
            storage: storage_config.open_storage().await?,
        };

        Ok(service_state)
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(storage: UploadStorage);
