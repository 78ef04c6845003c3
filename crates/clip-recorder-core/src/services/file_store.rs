use crate::error::{ServiceError, ServiceResult};

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, instrument};

/// Local file operations the session needs for committing and discarding
/// recordings.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Whether `path` exists.
    async fn exists(&self, path: &Path) -> ServiceResult<bool>;

    /// Copy `src` to `dst`, overwriting `dst`.
    async fn copy(&self, src: &Path, dst: &Path) -> ServiceResult<()>;

    /// Remove the file at `path`.
    async fn delete(&self, path: &Path) -> ServiceResult<()>;

    /// Create directory `path` (and parents).
    async fn mkdir(&self, path: &Path) -> ServiceResult<()>;
}

/// [`FileStore`] over the local filesystem using `tokio::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileStore;

#[async_trait]
impl FileStore for LocalFileStore {
    async fn exists(&self, path: &Path) -> ServiceResult<bool> {
        tokio::fs::try_exists(path)
            .await
            .map_err(|e| ServiceError::file_store("exists", path, e.to_string()))
    }

    #[instrument(skip(self))]
    async fn copy(&self, src: &Path, dst: &Path) -> ServiceResult<()> {
        let bytes = tokio::fs::copy(src, dst)
            .await
            .map_err(|e| ServiceError::file_store("copy", src, e.to_string()))?;

        debug!(bytes, "File copied");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, path: &Path) -> ServiceResult<()> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| ServiceError::file_store("delete", path, e.to_string()))
    }

    #[instrument(skip(self))]
    async fn mkdir(&self, path: &Path) -> ServiceResult<()> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| ServiceError::file_store("mkdir", path, e.to_string()))
    }
}
