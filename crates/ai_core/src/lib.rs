//! AI Core - Client for the multimodal inference engine
//!
//! Talks to the engine's OpenAI-compatible HTTP API: chat completions with
//! typed content parts (text, image, audio, video) and the health endpoint.
//! Also provides post-processing that removes reasoning traces from answers.

pub mod client;
pub mod config;
pub mod error;
pub mod ports;
pub mod reasoning;
pub mod types;

pub use client::{MediaAnswer, OmniClient};
pub use config::ClientConfig;
pub use error::InferenceError;
pub use ports::ChatEngine;
pub use reasoning::strip_reasoning;
pub use types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice, ContentPart, MediaUrl,
    MessageContent, ResponseMessage, TokenUsage,
};
