//! omni-serve command-line front end
//!
//! Shared by the `omni-serve`, `omni-start` and `omni-stop` binaries.

#![allow(clippy::print_stdout, clippy::print_stderr)]

pub mod app;
pub mod cli;
pub mod commands;
pub mod console;

use std::path::Path;

use anyhow::Context;
use infrastructure::{AppConfig, init_tracing};

pub use app::App;
pub use cli::{Cli, Commands};

/// Load configuration, set up logging and run one command
///
/// Returns the exit code for the process.
pub async fn run(verbose: u8, config_path: Option<&Path>, command: Commands) -> anyhow::Result<i32> {
    let config = AppConfig::load(config_path).with_context(|| match config_path {
        Some(path) => format!("failed to load configuration from {}", path.display()),
        None => "failed to load configuration".to_string(),
    })?;
    init_tracing(verbose, &config.telemetry)?;

    let app = App::new(config);
    match command {
        Commands::Start => Ok(commands::start(&app).await),
        Commands::Stop => Ok(commands::stop(&app).await),
        Commands::Status { json } => commands::status(&app, json).await,
        Commands::Ask {
            video_url,
            prompt,
            raw,
            url,
        } => Ok(commands::ask(&app, &video_url, &prompt, raw, url.as_deref()).await),
        Commands::Config => commands::config(&app),
    }
}
