//! omni-serve CLI
//!
//! Starts, stops and inspects the inference engine and its asset server.

use clap::Parser;
use presentation_cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let code = presentation_cli::run(cli.verbose, cli.config.as_deref(), cli.command).await?;
    std::process::exit(code);
}
