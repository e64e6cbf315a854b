//! Advisory file lock shared by launcher and terminator

use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use application::error::ApplicationError;
use application::ports::{LifecycleLockPort, LockGuard};
use async_trait::async_trait;
use tracing::debug;

/// Exclusive lock on a file; released when the guard is dropped
#[derive(Debug, Clone)]
pub struct FileLifecycleLock {
    path: PathBuf,
}

impl FileLifecycleLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn lock_blocking(path: &std::path::Path) -> Result<File, ApplicationError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ApplicationError::io(parent.display(), &e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(|e| ApplicationError::io(path.display(), &e))?;
        file.lock()
            .map_err(|e| ApplicationError::Lock(format!("{}: {e}", path.display())))?;
        Ok(file)
    }
}

#[async_trait]
impl LifecycleLockPort for FileLifecycleLock {
    async fn acquire(&self) -> Result<LockGuard, ApplicationError> {
        let path = self.path.clone();
        let file = tokio::task::spawn_blocking(move || Self::lock_blocking(&path))
            .await
            .map_err(|e| ApplicationError::Internal(format!("lock task failed: {e}")))??;
        debug!(path = %self.path.display(), "Lifecycle lock held");
        // Closing the file releases the lock
        Ok(LockGuard::new(file))
    }
}
