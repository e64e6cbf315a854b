//! Integration tests for CLI
//!
//! These tests verify command parsing and the configuration entry point
//! without starting any service.

#![allow(clippy::panic)] // Allow panic! in tests for clear failure messages

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use presentation_cli::cli::{DEMO_PROMPT, DEMO_VIDEO_URL};
use presentation_cli::{Cli, Commands};
use tempfile::TempDir;

fn parse_args(args: &[&str]) -> Result<Cli, clap::Error> {
    let os_args: Vec<OsString> = args.iter().map(OsString::from).collect();
    Cli::try_parse_from(os_args)
}

#[test]
fn cli_parses_start_command() {
    let cli = parse_args(&["omni-serve", "start"]).unwrap();
    assert_eq!(cli.command, Commands::Start);
}

#[test]
fn cli_parses_stop_command() {
    let cli = parse_args(&["omni-serve", "stop"]).unwrap();
    assert_eq!(cli.command, Commands::Stop);
}

#[test]
fn cli_parses_status_command() {
    let cli = parse_args(&["omni-serve", "status"]).unwrap();
    assert_eq!(cli.command, Commands::Status { json: false });
}

#[test]
fn cli_parses_status_json() {
    let cli = parse_args(&["omni-serve", "status", "--json"]).unwrap();
    assert_eq!(cli.command, Commands::Status { json: true });
}

#[test]
fn cli_parses_ask_command() {
    let cli = parse_args(&[
        "omni-serve",
        "ask",
        "http://127.0.0.1:8080/clip.mp4",
        "Describe this video.",
    ])
    .unwrap();
    if let Commands::Ask {
        video_url,
        prompt,
        raw,
        url,
    } = cli.command
    {
        assert_eq!(video_url, "http://127.0.0.1:8080/clip.mp4");
        assert_eq!(prompt, "Describe this video.");
        assert!(!raw);
        assert!(url.is_none());
    } else {
        panic!("Expected Ask command");
    }
}

#[test]
fn cli_parses_ask_with_raw_and_url() {
    let cli = parse_args(&[
        "omni-serve",
        "ask",
        "http://media/clip.mp4",
        "What happens?",
        "--raw",
        "-u",
        "http://gpu-box:8002",
    ])
    .unwrap();
    if let Commands::Ask { raw, url, .. } = cli.command {
        assert!(raw);
        assert_eq!(url.as_deref(), Some("http://gpu-box:8002"));
    } else {
        panic!("Expected Ask command");
    }
}

#[test]
fn cli_ask_without_arguments_uses_demo_clip() {
    let cli = parse_args(&["omni-serve", "ask"]).unwrap();
    if let Commands::Ask {
        video_url, prompt, ..
    } = cli.command
    {
        assert_eq!(video_url, DEMO_VIDEO_URL);
        assert_eq!(prompt, DEMO_PROMPT);
    } else {
        panic!("Expected Ask command");
    }
}

#[test]
fn cli_ask_with_video_only_uses_demo_prompt() {
    let cli = parse_args(&["omni-serve", "ask", "http://media/clip.mp4"]).unwrap();
    if let Commands::Ask {
        video_url, prompt, ..
    } = cli.command
    {
        assert_eq!(video_url, "http://media/clip.mp4");
        assert_eq!(prompt, DEMO_PROMPT);
    } else {
        panic!("Expected Ask command");
    }
}

#[test]
fn cli_parses_config_command() {
    let cli = parse_args(&["omni-serve", "config"]).unwrap();
    assert_eq!(cli.command, Commands::Config);
}

#[test]
fn cli_parses_verbose_flag() {
    let cli = parse_args(&["omni-serve", "-v", "status"]).unwrap();
    assert_eq!(cli.verbose, 1);
}

#[test]
fn cli_verbose_flag_is_global() {
    let cli = parse_args(&["omni-serve", "stop", "-vvv"]).unwrap();
    assert_eq!(cli.verbose, 3);
}

#[test]
fn cli_parses_config_path() {
    let cli = parse_args(&["omni-serve", "--config", "/etc/omni-serve.toml", "start"]).unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("/etc/omni-serve.toml")));
}

#[test]
fn cli_config_path_after_subcommand() {
    let cli = parse_args(&["omni-serve", "stop", "-c", "custom.toml"]).unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
}

#[test]
fn cli_requires_subcommand() {
    let result = parse_args(&["omni-serve"]);
    assert!(result.is_err());
}

#[test]
fn cli_rejects_unknown_subcommand() {
    let result = parse_args(&["omni-serve", "restart"]);
    assert!(result.is_err());
}

#[tokio::test]
async fn run_fails_for_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    let err = presentation_cli::run(0, Some(&missing), Commands::Config)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("absent.toml"));
}

#[tokio::test]
async fn run_prints_config_and_exits_zero() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("omni-serve.toml");
    std::fs::write(&path, "[engine]\nport = 8100\n").unwrap();

    let code = presentation_cli::run(0, Some(&path), Commands::Config)
        .await
        .unwrap();
    assert_eq!(code, 0);
}
