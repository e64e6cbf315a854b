//! Directory preparation port

use std::path::Path;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for creating directories the services write into
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DirectoryPort: Send + Sync {
    /// Create `path` and its parents; `Ok(true)` when something was created
    async fn ensure_dir(&self, path: &Path) -> Result<bool, ApplicationError>;
}
