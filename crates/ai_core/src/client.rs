//! HTTP client for the engine's OpenAI-compatible API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::InferenceError;
use crate::ports::ChatEngine;
use crate::reasoning::strip_reasoning;
use crate::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart, TokenUsage,
};

/// Answer to a single question about a media file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAnswer {
    /// Text shown to the user
    pub text: String,
    /// First choice exactly as returned
    pub raw: String,
    pub usage: Option<TokenUsage>,
    pub model: String,
}

impl MediaAnswer {
    /// Whether post-processing removed anything
    pub fn was_stripped(&self) -> bool {
        self.text != self.raw
    }

    /// Rough word-count difference between raw and cleaned output
    pub fn estimated_words_saved(&self) -> usize {
        self.raw
            .split_whitespace()
            .count()
            .saturating_sub(self.text.split_whitespace().count())
    }
}

/// Client for the multimodal engine
#[derive(Debug, Clone)]
pub struct OmniClient {
    client: Client,
    config: ClientConfig,
    base_url: String,
}

impl OmniClient {
    /// Create a client; `engine_url` is used when the config has no base URL
    pub fn new(config: ClientConfig, engine_url: &str) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| InferenceError::RequestFailed(e.to_string()))?;
        let base_url = config.resolve_base_url(engine_url);

        info!(base_url = %base_url, "Initialized engine client");

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Build a request with the configured sampling parameters
    pub fn request(&self, messages: Vec<ChatMessage>) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            top_k: self.config.top_k,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Ask one question about a video
    ///
    /// The message carries the video part first, then the prompt.
    #[instrument(skip(self, prompt))]
    pub async fn ask_about_video(
        &self,
        video_url: &str,
        prompt: &str,
    ) -> Result<MediaAnswer, InferenceError> {
        let request = self.request(vec![ChatMessage::user_parts(vec![
            ContentPart::video(video_url),
            ContentPart::text(prompt),
        ])]);

        let response = self.complete(request).await?;
        let raw = response
            .first_content()
            .ok_or_else(|| InferenceError::InvalidResponse("no choices in response".to_string()))?
            .to_string();

        let text = if self.config.strip_reasoning {
            strip_reasoning(&raw)
        } else {
            raw.clone()
        };

        Ok(MediaAnswer {
            text,
            raw,
            usage: response.usage,
            model: response.model,
        })
    }
}

#[async_trait]
impl ChatEngine for OmniClient {
    #[instrument(skip(self, request), fields(messages = request.messages.len()))]
    async fn complete(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, InferenceError> {
        let url = self.api_url("v1/chat/completions");
        debug!(url = %url, "Sending chat completion");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| InferenceError::from_transport(&e, &self.base_url, self.config.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Chat completion failed");
            return Err(InferenceError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| InferenceError::from_transport(&e, &self.base_url, self.config.timeout_ms))?;
        let completion: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| InferenceError::InvalidResponse(format!("{e}: {body}")))?;

        debug!(usage = ?completion.usage, "Chat completion finished");
        Ok(completion)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> bool {
        let response = self
            .client
            .get(self.api_url("health"))
            .timeout(Duration::from_millis(self.config.health_timeout_ms))
            .send()
            .await;

        match response {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Engine health check failed");
                false
            },
        }
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
