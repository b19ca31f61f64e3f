//! Local filesystem storage for uploaded files.
//!
//! Files land directly under the configured upload directory, named by the
//! client-supplied filename. Content is copied in fixed [`CHUNK_SIZE`] blocks
//! so peak memory per upload stays bounded regardless of the file size.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

use crate::service::{Error, Result, StorageConfig};

/// Tracing target for storage operations.
const TRACING_TARGET: &str = "filedrop_server::service::storage";

/// Size of each block read from the upload stream and written to disk.
pub const CHUNK_SIZE: usize = 8192;

/// Upload directory handle shared by all requests.
///
/// There is no locking: concurrent uploads to the same filename race and
/// the last writer wins.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    config: Arc<StorageConfig>,
}

impl UploadStorage {
    /// Creates the upload directory if it is missing and returns the storage.
    ///
    /// # Errors
    ///
    /// Returns a [`Config`] error if the path exists but is not a directory,
    /// and a [`FileSystem`] error if the directory cannot be created.
    ///
    /// [`Config`]: crate::ErrorKind::Config
    /// [`FileSystem`]: crate::ErrorKind::FileSystem
    pub async fn init(config: StorageConfig) -> Result<Self> {
        let upload_dir = config.upload_dir.as_path();

        match fs::metadata(upload_dir).await {
            Ok(metadata) if !metadata.is_dir() => {
                return Err(Error::config(format!(
                    "upload path is not a directory: {}",
                    upload_dir.display()
                )));
            }
            Ok(_) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    upload_dir = %upload_dir.display(),
                    "upload directory already exists"
                );
            }
            Err(_) => {
                fs::create_dir_all(upload_dir).await.map_err(|err| {
                    Error::file_system(format!(
                        "failed to create upload directory: {}",
                        upload_dir.display()
                    ))
                    .with_source(err)
                })?;

                tracing::info!(
                    target: TRACING_TARGET,
                    upload_dir = %upload_dir.display(),
                    "upload directory created"
                );
            }
        }

        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Returns the directory uploads are written to.
    #[must_use]
    pub fn upload_dir(&self) -> &Path {
        &self.config.upload_dir
    }

    /// Returns the destination path for a client-supplied filename.
    ///
    /// The filename is joined verbatim unless path traversal rejection is
    /// enabled, in which case only plain relative names are accepted.
    pub fn destination(&self, filename: &str) -> Result<PathBuf> {
        if self.config.reject_path_traversal && !is_contained(filename) {
            return Err(Error::invalid_input(format!(
                "filename escapes the upload directory: {filename}"
            )));
        }

        Ok(self.config.upload_dir.join(filename))
    }

    /// Streams `reader` into the destination for `filename`.
    ///
    /// Any existing file is truncated. Reads [`CHUNK_SIZE`] bytes at a time
    /// until a zero-length read and returns the number of bytes written.
    pub async fn store<R>(&self, filename: &str, reader: R) -> Result<u64>
    where
        R: AsyncRead,
    {
        let path = self.destination(filename)?;
        let mut reader = std::pin::pin!(reader);

        let mut file = File::create(&path).await.map_err(|err| {
            Error::file_system(format!("failed to create file: {}", path.display()))
                .with_source(err)
        })?;

        let mut chunk = vec![0u8; CHUNK_SIZE];
        let mut written: u64 = 0;

        loop {
            let read = reader.read(&mut chunk).await.map_err(|err| {
                Error::invalid_input("failed to read upload stream").with_source(err)
            })?;

            if read == 0 {
                break;
            }

            file.write_all(&chunk[..read]).await.map_err(|err| {
                Error::file_system(format!("failed to write file: {}", path.display()))
                    .with_source(err)
            })?;

            written += read as u64;
        }

        file.flush().await.map_err(|err| {
            Error::file_system(format!("failed to flush file: {}", path.display()))
                .with_source(err)
        })?;

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path.display(),
            bytes = written,
            "file stored"
        );

        Ok(written)
    }
}

/// Returns `true` if `filename` only contains normal path components.
fn is_contained(filename: &str) -> bool {
    Path::new(filename)
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::ErrorKind;

    async fn storage_in(dir: &TempDir, reject_path_traversal: bool) -> Result<UploadStorage> {
        let config = StorageConfig {
            upload_dir: dir.path().join("uploads"),
            reject_path_traversal,
        };

        UploadStorage::init(config).await
    }

    #[tokio::test]
    async fn init_creates_nested_directory() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let config = StorageConfig {
            upload_dir: dir.path().join("a").join("b").join("uploads"),
            reject_path_traversal: false,
        };

        let storage = UploadStorage::init(config).await?;
        assert!(storage.upload_dir().is_dir());
        Ok(())
    }

    #[tokio::test]
    async fn init_is_idempotent() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        storage_in(&dir, false).await?;
        let storage = storage_in(&dir, false).await?;
        assert!(storage.upload_dir().is_dir());
        Ok(())
    }

    #[tokio::test]
    async fn init_rejects_file_in_place_of_directory() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("uploads");
        std::fs::write(&path, b"not a directory")?;

        let config = StorageConfig {
            upload_dir: path,
            reject_path_traversal: false,
        };

        let error = UploadStorage::init(config).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Config);
        Ok(())
    }

    #[tokio::test]
    async fn store_copies_partial_final_chunk() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let storage = storage_in(&dir, false).await?;

        let content: Vec<u8> = (0..CHUNK_SIZE + 1).map(|i| (i % 251) as u8).collect();
        let written = storage.store("big.bin", content.as_slice()).await?;

        assert_eq!(written, content.len() as u64);
        assert_eq!(std::fs::read(storage.upload_dir().join("big.bin"))?, content);
        Ok(())
    }

    #[tokio::test]
    async fn store_truncates_existing_file() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let storage = storage_in(&dir, false).await?;

        storage.store("dup.txt", &b"longer content"[..]).await?;
        storage.store("dup.txt", &b"BB"[..]).await?;

        assert_eq!(std::fs::read(storage.upload_dir().join("dup.txt"))?, b"BB");
        Ok(())
    }

    #[tokio::test]
    async fn store_reports_missing_directory() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let storage = storage_in(&dir, false).await?;
        std::fs::remove_dir(storage.upload_dir())?;

        let error = storage.store("gone.txt", &b"data"[..]).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::FileSystem);
        Ok(())
    }

    #[tokio::test]
    async fn destination_joins_filename_verbatim() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let storage = storage_in(&dir, false).await?;

        let path = storage.destination("../outside.txt")?;
        assert_eq!(path, storage.upload_dir().join("../outside.txt"));
        Ok(())
    }

    #[tokio::test]
    async fn destination_rejects_traversal_when_enabled() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let storage = storage_in(&dir, true).await?;

        for filename in ["../outside.txt", "/etc/passwd", "nested/../../x"] {
            let error = storage.destination(filename).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::InvalidInput, "{filename}");
        }

        assert!(storage.destination("report.pdf").is_ok());
        Ok(())
    }

    #[test]
    fn contained_filenames() {
        assert!(is_contained("test.txt"));
        assert!(is_contained("nested/file.txt"));
        assert!(!is_contained(".."));
        assert!(!is_contained("../x"));
        assert!(!is_contained("/abs"));
    }
}
