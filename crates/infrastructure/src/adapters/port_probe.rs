//! TCP connect probe

use std::time::Duration;

use application::ports::PortProbePort;
use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Probes a port by opening and dropping a TCP connection
#[derive(Debug, Clone)]
pub struct TcpPortProbe {
    connect_timeout: Duration,
}

impl TcpPortProbe {
    pub const fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl PortProbePort for TcpPortProbe {
    async fn is_listening(&self, host: &str, port: u16) -> bool {
        let listening = matches!(
            timeout(self.connect_timeout, TcpStream::connect((host, port))).await,
            Ok(Ok(_))
        );
        trace!(host, port, listening, "Port probed");
        listening
    }
}
