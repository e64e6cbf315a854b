//! TCP port probe port

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Port for checking whether something accepts connections on a TCP port
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PortProbePort: Send + Sync {
    /// Whether a connection to `host:port` succeeds
    async fn is_listening(&self, host: &str, port: u16) -> bool;
}
