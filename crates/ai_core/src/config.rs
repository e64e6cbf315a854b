//! Configuration for the engine client

use serde::{Deserialize, Serialize};

/// Configuration for requests against the inference engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the engine. When unset, it is derived from the engine's
    /// host and port.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Model name sent with each request. The engine serves a single model,
    /// so this is usually left unset.
    #[serde(default)]
    pub model: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Timeout for the health probe in milliseconds
    #[serde(default = "default_health_timeout_ms")]
    pub health_timeout_ms: u64,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Top-p (nucleus) sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Top-k sampling
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Remove reasoning traces from answers
    #[serde(default = "default_strip_reasoning")]
    pub strip_reasoning: bool,
}

const fn default_timeout_ms() -> u64 {
    300_000 // long videos take minutes
}

const fn default_health_timeout_ms() -> u64 {
    5_000
}

const fn default_temperature() -> f32 {
    0.6
}

const fn default_top_p() -> f32 {
    0.95
}

const fn default_top_k() -> u32 {
    20
}

const fn default_max_tokens() -> u32 {
    16_384
}

const fn default_strip_reasoning() -> bool {
    true
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: None,
            timeout_ms: default_timeout_ms(),
            health_timeout_ms: default_health_timeout_ms(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_tokens: default_max_tokens(),
            strip_reasoning: default_strip_reasoning(),
        }
    }
}

impl ClientConfig {
    /// Config pointing at a fixed base URL
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Default::default()
        }
    }

    /// Base URL to use, falling back to the given engine URL
    pub fn resolve_base_url(&self, engine_url: &str) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(engine_url)
            .trim_end_matches('/')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_sampling_defaults() {
        let config = ClientConfig::default();
        assert!(config.base_url.is_none());
        assert_eq!(config.timeout_ms, 300_000);
        assert!((config.temperature - 0.6).abs() < 0.001);
        assert!((config.top_p - 0.95).abs() < 0.001);
        assert_eq!(config.top_k, 20);
        assert_eq!(config.max_tokens, 16_384);
        assert!(config.strip_reasoning);
    }

    #[test]
    fn config_deserialization_with_defaults() {
        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.health_timeout_ms, 5_000);
        assert_eq!(config.top_k, 20);
    }

    #[test]
    fn config_deserialization_overrides() {
        let json = r#"{"base_url":"http://gpu-box:9000","max_tokens":512,"strip_reasoning":false}"#;
        let config: ClientConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://gpu-box:9000"));
        assert_eq!(config.max_tokens, 512);
        assert!(!config.strip_reasoning);
    }

    #[test]
    fn resolve_base_url_prefers_explicit_value() {
        let config = ClientConfig::for_base_url("http://gpu-box:9000/");
        assert_eq!(
            config.resolve_base_url("http://127.0.0.1:8002"),
            "http://gpu-box:9000"
        );
    }

    #[test]
    fn resolve_base_url_falls_back_to_engine() {
        let config = ClientConfig::default();
        assert_eq!(
            config.resolve_base_url("http://127.0.0.1:8002"),
            "http://127.0.0.1:8002"
        );
    }
}
