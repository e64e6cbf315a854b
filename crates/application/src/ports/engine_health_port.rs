//! Engine health port

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Port for asking the running engine whether it is ready
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EngineHealthPort: Send + Sync {
    /// Whether the engine's health endpoint answers successfully
    async fn is_healthy(&self) -> bool;
}
