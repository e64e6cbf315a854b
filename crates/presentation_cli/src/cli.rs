//! Command-line definition

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "OMNI_SERVE_CONFIG";

/// Video used by `ask` when none is given
pub const DEMO_VIDEO_URL: &str =
    "https://qianwen-res.oss-cn-beijing.aliyuncs.com/Qwen3-Omni/demo/draw.mp4";

/// Prompt used by `ask` when none is given
pub const DEMO_PROMPT: &str =
    "Describe this video in detail, including the visual content and any audio you can hear.";

/// omni-serve CLI
#[derive(Debug, Parser)]
#[command(name = "omni-serve")]
#[command(
    author,
    version,
    about = "Start and stop a multimodal inference engine and its media server",
    long_about = None
)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (default: ./omni-serve.toml if present)
    #[arg(short, long, env = CONFIG_PATH_ENV, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Start the asset server (unless already running) and run the engine
    ///
    /// Blocks until the engine exits and exits with the engine's code.
    Start,

    /// Stop the asset server and every engine process
    ///
    /// Succeeds when nothing is running.
    Stop,

    /// Show whether both services are up
    Status {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the engine a question about a video
    ///
    /// Example: omni-serve ask http://127.0.0.1:8080/clip.mp4 "Describe this video."
    /// Without arguments a public demo clip and prompt are used.
    Ask {
        /// URL of the video file
        #[arg(default_value = DEMO_VIDEO_URL)]
        video_url: String,

        /// Prompt sent with the video
        #[arg(default_value = DEMO_PROMPT)]
        prompt: String,

        /// Keep reasoning traces in the answer
        #[arg(long)]
        raw: bool,

        /// Engine base URL (default: derived from the engine settings)
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Print the effective configuration as TOML
    Config,
}

/// Configuration path for the flagless binaries
pub fn config_path_from_env() -> Option<PathBuf> {
    std::env::var_os(CONFIG_PATH_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
