//! Stop the asset server and every inference engine process

use presentation_cli::{Commands, cli::config_path_from_env};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config_path_from_env();
    let code = presentation_cli::run(0, config.as_deref(), Commands::Stop).await?;
    std::process::exit(code);
}
