//! Engine health over HTTP

use std::sync::Arc;

use ai_core::ChatEngine;
use application::ports::EngineHealthPort;
use async_trait::async_trait;

/// Adapts an engine client to the health port
#[derive(Clone)]
pub struct EngineHealthAdapter {
    engine: Arc<dyn ChatEngine>,
}

impl std::fmt::Debug for EngineHealthAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHealthAdapter")
            .field("base_url", &self.engine.base_url())
            .finish()
    }
}

impl EngineHealthAdapter {
    pub fn new(engine: Arc<dyn ChatEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl EngineHealthPort for EngineHealthAdapter {
    async fn is_healthy(&self) -> bool {
        self.engine.health_check().await
    }
}
