use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::Args;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::service::{Error, Result, UploadStorage};

/// Default values for configuration options.
mod defaults {
    use std::path::PathBuf;

    /// Default storage root, relative to the working directory.
    pub const UPLOAD_DIR: &str = "./uploads";

    pub fn upload_dir() -> PathBuf {
        UPLOAD_DIR.into()
    }
}

/// Upload [`storage`] configuration.
///
/// [`storage`]: crate::service::UploadStorage
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct StorageConfig {
    /// Directory that receives uploaded files.
    ///
    /// Created (recursively) during startup if it does not exist.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "UPLOAD_DIR", default_value = defaults::UPLOAD_DIR)
    )]
    #[builder(default = "defaults::upload_dir()")]
    #[serde(default = "defaults::upload_dir")]
    pub upload_dir: PathBuf,

    /// Rejects filenames that are absolute or contain `..` components.
    ///
    /// Disabled by default: filenames are joined onto the upload directory
    /// exactly as the client sent them.
    #[cfg_attr(feature = "config", arg(long, env = "REJECT_PATH_TRAVERSAL"))]
    #[builder(default)]
    #[serde(default)]
    pub reject_path_traversal: bool,
}

impl StorageConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> StorageConfigBuilder {
        StorageConfigBuilder::default()
    }

    /// Creates the upload directory and returns the storage backed by it.
    pub async fn open_storage(&self) -> Result<UploadStorage> {
        UploadStorage::init(self.clone()).await
    }
}

impl StorageConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(ref upload_dir) = self.upload_dir
            && upload_dir.as_os_str().is_empty()
        {
            return Err("upload directory cannot be empty".into());
        }

        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: defaults::upload_dir(),
            reject_path_traversal: false,
        }
    }
}

impl From<StorageConfigBuilderError> for Error {
    fn from(err: StorageConfigBuilderError) -> Self {
        Error::config(err.to_string()).with_source(err)
    }
}
