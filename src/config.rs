//! Configuration for the task board, read from `.taskboard/taskboard.toml`.
//!
//! Layered: file → environment → CLI flags. Every field has a default, so a
//! missing file is the same as an empty one.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3141
//! db_path = ".taskboard/taskboard.db"
//!
//! [github]
//! api_base = "https://api.github.com"
//! client_id = "Iv1.abc"
//! client_secret = "..."
//! user_agent = "taskboard"
//! timeout_secs = 10
//! ```
//!
//! Environment: `GITHUB_CLIENT_ID`, `GITHUB_CLIENT_SECRET` and
//! `TASKBOARD_GITHUB_API` override the `[github]` section. A `.env` file in
//! the working directory is loaded first.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::board::github::{ClientCredentials, DEFAULT_USER_AGENT, GITHUB_API_BASE};

pub const DATA_DIR: &str = ".taskboard";
pub const CONFIG_FILE: &str = "taskboard.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BoardConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub github: GitHubSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3141
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DATA_DIR).join("taskboard.db")
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GitHubSection {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout for commit lookups.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    GITHUB_API_BASE.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for GitHubSection {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            client_id: None,
            client_secret: None,
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GitHubSection {
    /// Credentials are only sent when both halves are present.
    pub fn credentials(&self) -> Option<ClientCredentials> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some(ClientCredentials {
                    client_id: id.clone(),
                    client_secret: secret.clone(),
                })
            }
            _ => None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl BoardConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse taskboard.toml")
    }

    /// Load `taskboard.toml` from the data dir, or defaults if it doesn't exist.
    pub fn load_or_default(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// File, then `.env`, then process environment.
    pub fn resolve(data_dir: &Path) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut config = Self::load_or_default(data_dir)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize taskboard.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Overlay environment values. `lookup` is `std::env::var` outside tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(id) = non_empty("GITHUB_CLIENT_ID") {
            self.github.client_id = Some(id);
        }
        if let Some(secret) = non_empty("GITHUB_CLIENT_SECRET") {
            self.github.client_secret = Some(secret);
        }
        if let Some(api) = non_empty("TASKBOARD_GITHUB_API") {
            self.github.api_base = api;
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0: the OS will pick a random port".to_string());
        }
        if !self.github.api_base.starts_with("http://")
            && !self.github.api_base.starts_with("https://")
        {
            warnings.push(format!(
                "Invalid github.api_base '{}': should start with http:// or https://",
                self.github.api_base
            ));
        }
        if self.github.timeout_secs == 0 {
            warnings.push("github.timeout_secs is 0: every commit lookup will time out".to_string());
        }
        if self.github.client_id.is_some() != self.github.client_secret.is_some() {
            warnings.push(
                "Only one of github.client_id / github.client_secret is set; credentials will not be sent"
                    .to_string(),
            );
        }
        if self.github.user_agent.trim().is_empty() {
            warnings.push("github.user_agent is empty; GitHub rejects requests without one".to_string());
        }

        warnings
    }
}
