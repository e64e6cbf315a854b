//! Static asset server settings
//!
//! The asset server is any program that serves a directory over HTTP. Its
//! arguments are a template; `{host}`, `{port}` and `{directory}` are
//! substituted at launch time.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Configuration for the static asset server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetServerSettings {
    /// Program to run
    #[serde(default = "default_program")]
    pub program: String,

    /// Argument template
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory to serve; created when missing
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Where the spawned server's process record is kept
    #[serde(default = "default_record_file")]
    pub record_file: PathBuf,

    /// Output of a spawned server
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_program() -> String {
    "python3".to_string()
}

fn default_args() -> Vec<String> {
    ["-m", "http.server", "{port}", "--bind", "{host}", "--directory", "{directory}"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8080
}

fn default_directory() -> PathBuf {
    PathBuf::from("media")
}

fn default_record_file() -> PathBuf {
    PathBuf::from("run/asset_server.pid")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("logs/asset_server.log")
}

impl Default for AssetServerSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            host: default_host(),
            port: default_port(),
            directory: default_directory(),
            record_file: default_record_file(),
            log_file: default_log_file(),
        }
    }
}

impl AssetServerSettings {
    /// Host used to probe and address the server
    pub fn connect_host(&self) -> &str {
        super::connect_host(&self.host)
    }

    /// URL under which the served directory is reachable
    pub fn url(&self) -> String {
        super::http_url(&self.host, self.port)
    }

    /// Expand the argument template
    ///
    /// Only the template is checked for unknown placeholders; substituted
    /// values are passed through untouched.
    pub fn render_args(&self) -> Result<Vec<String>, DomainError> {
        let port = self.port.to_string();
        let directory = self.directory.display().to_string();

        self.args
            .iter()
            .map(|arg| {
                if let Some(placeholder) = unknown_placeholder(arg) {
                    return Err(DomainError::unknown_placeholder(placeholder, arg));
                }
                Ok(arg
                    .replace("{host}", &self.host)
                    .replace("{port}", &port)
                    .replace("{directory}", &directory))
            })
            .collect()
    }
}

const PLACEHOLDERS: [&str; 3] = ["{host}", "{port}", "{directory}"];

/// First `{...}` token in `template` that is not a known placeholder
fn unknown_placeholder(template: &str) -> Option<&str> {
    let mut rest = template;
    let mut offset = 0;
    while let Some(start) = rest.find('{') {
        let len = rest[start..].find('}')?;
        let token = &rest[start..=start + len];
        if !PLACEHOLDERS.contains(&token) {
            return Some(&template[offset + start..=offset + start + len]);
        }
        offset += start + len + 1;
        rest = &template[offset..];
    }
    None
}
