//! Directory creation on the local filesystem

use std::path::Path;

use application::error::ApplicationError;
use application::ports::DirectoryPort;
use async_trait::async_trait;
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct FsDirectories;

#[async_trait]
impl DirectoryPort for FsDirectories {
    async fn ensure_dir(&self, path: &Path) -> Result<bool, ApplicationError> {
        if path.as_os_str().is_empty() {
            return Ok(false);
        }
        if tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir()) {
            return Ok(false);
        }
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| ApplicationError::io(path.display(), &e))?;
        info!(path = %path.display(), "Created directory");
        Ok(true)
    }
}
