//! Engine abstraction

use async_trait::async_trait;

use crate::error::InferenceError;
use crate::types::{ChatCompletionRequest, ChatCompletionResponse};

/// An engine that answers chat completions
#[async_trait]
pub trait ChatEngine: Send + Sync {
    /// Send one completion request
    async fn complete(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, InferenceError>;

    /// Whether the engine reports itself healthy
    async fn health_check(&self) -> bool;

    /// Base URL requests are sent to
    fn base_url(&self) -> &str;
}
