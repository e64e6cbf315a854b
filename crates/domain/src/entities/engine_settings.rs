//! Inference engine settings
//!
//! Values are passed to the engine verbatim. Nothing here range-checks the
//! numbers; the engine is the authority on what it accepts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::value_objects::CommandPattern;

/// Configuration for the external inference engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Engine executable, resolved against `PATH`
    #[serde(default = "default_program")]
    pub program: String,

    /// Model directory or hub identifier
    #[serde(default = "default_model_path")]
    pub model_path: String,

    /// Listen address
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Numeric precision tag (e.g. "bfloat16", "auto")
    #[serde(default = "default_dtype")]
    pub dtype: String,

    /// Maximum context length in tokens
    #[serde(default = "default_max_model_len")]
    pub max_model_len: u32,

    /// Tensor-parallel degree
    #[serde(default = "default_tensor_parallel_size")]
    pub tensor_parallel_size: u32,

    /// Fraction of GPU memory the engine may claim
    #[serde(default = "default_gpu_memory_utilization")]
    pub gpu_memory_utilization: f64,

    /// Maximum concurrently scheduled sequences
    #[serde(default = "default_max_num_seqs")]
    pub max_num_seqs: u32,

    /// Allow the model repository to ship custom code
    #[serde(default = "default_true")]
    pub trust_remote_code: bool,

    /// Local directory the engine may read media from.
    /// Falls back to the asset server directory when unset.
    #[serde(default)]
    pub allowed_local_media_path: Option<PathBuf>,

    /// Pattern used to find running engine processes
    #[serde(default = "default_match_pattern")]
    pub match_pattern: CommandPattern,

    /// Isolated runtime prefix (virtualenv or conda env) holding the engine
    #[serde(default)]
    pub runtime_dir: Option<PathBuf>,

    /// Extra environment variables for the engine process
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Append-only log of the engine's combined output
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_program() -> String {
    "vllm".to_string()
}

fn default_model_path() -> String {
    "Qwen/Qwen3-Omni-30B-A3B-Instruct".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8002
}

fn default_dtype() -> String {
    "bfloat16".to_string()
}

const fn default_max_model_len() -> u32 {
    32768
}

const fn default_tensor_parallel_size() -> u32 {
    2
}

const fn default_gpu_memory_utilization() -> f64 {
    0.95
}

const fn default_max_num_seqs() -> u32 {
    8
}

const fn default_true() -> bool {
    true
}

#[allow(clippy::expect_used)]
fn default_match_pattern() -> CommandPattern {
    CommandPattern::new("vllm serve").expect("static pattern is not blank")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("logs/engine.log")
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            model_path: default_model_path(),
            host: default_host(),
            port: default_port(),
            dtype: default_dtype(),
            max_model_len: default_max_model_len(),
            tensor_parallel_size: default_tensor_parallel_size(),
            gpu_memory_utilization: default_gpu_memory_utilization(),
            max_num_seqs: default_max_num_seqs(),
            trust_remote_code: true,
            allowed_local_media_path: None,
            match_pattern: default_match_pattern(),
            runtime_dir: None,
            env: BTreeMap::new(),
            log_file: default_log_file(),
        }
    }
}

impl EngineSettings {
    /// Engine arguments for the given media directory
    pub fn command_args(&self, media_path: &Path) -> Vec<String> {
        let mut args = vec![
            "serve".to_string(),
            self.model_path.clone(),
            "--host".to_string(),
            self.host.clone(),
            "--port".to_string(),
            self.port.to_string(),
            "--dtype".to_string(),
            self.dtype.clone(),
            "--max-model-len".to_string(),
            self.max_model_len.to_string(),
            "--allowed-local-media-path".to_string(),
            media_path.display().to_string(),
            "--tensor-parallel-size".to_string(),
            self.tensor_parallel_size.to_string(),
            "--gpu-memory-utilization".to_string(),
            self.gpu_memory_utilization.to_string(),
        ];
        if self.trust_remote_code {
            args.push("--trust-remote-code".to_string());
        }
        args.push("--max-num-seqs".to_string());
        args.push(self.max_num_seqs.to_string());
        args
    }

    /// Base URL clients use to reach the engine
    pub fn base_url(&self) -> String {
        super::http_url(&self.host, self.port)
    }
}
