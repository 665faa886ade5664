//! Configuration loading and management for repodigest.
//!
//! Loads settings from `repodigest.toml` with environment variable overrides for the GitHub token.

use crate::digest::{DigestOptions, DEFAULT_CHAR_BUDGET, DEFAULT_EXTENSIONS, MAX_FILE_BYTES, README_LIMIT};
use crate::github::{DEFAULT_API_URL, REQUEST_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CONFIG_FILE: &str = "repodigest.toml";

/// Environment variables checked for a GitHub token, in priority order
const TOKEN_VARS: [&str; 2] = ["GITHUB_API_KEY", "GITHUB_TOKEN"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("missing GitHub token: set GITHUB_API_KEY or [github] token")]
    MissingToken,
}

/// GitHub API access
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// REST endpoint, e.g. a GitHub Enterprise `/api/v3` URL
    pub api_url: String,
    /// Personal access token; prefer the environment variables
    pub token: Option<String>,
    pub timeout_secs: u64,
}

/// Digest limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    pub char_budget: usize,
    pub readme_limit: usize,
    /// Files above this size are skipped; 0 disables the ceiling
    pub max_file_bytes: u64,
    pub extensions: Vec<String>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub digest: DigestConfig,
}

impl Config {
    /// Load configuration from the default location (repodigest.toml in cwd or home).
    ///
    /// Falls back to defaults when no config file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::parse(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Parse TOML without consulting the environment
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Override the token from environment variables
    fn apply_env(&mut self) {
        if let Some(token) = TOKEN_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        {
            self.github.token = Some(token);
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        // Check home directory
        let home_config = dirs::home_dir()?
            .join(".config")
            .join("repodigest")
            .join(CONFIG_FILE);
        home_config.exists().then_some(home_config)
    }

    /// The configured token, empty when unauthenticated
    pub fn token(&self) -> &str {
        self.github.token.as_deref().unwrap_or_default()
    }

    /// The configured token, for callers that refuse to run unauthenticated
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.github
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.github.timeout_secs)
    }

    /// Request-scoped options for the digest builder
    pub fn digest_options(&self) -> DigestOptions {
        DigestOptions {
            char_budget: self.digest.char_budget,
            readme_limit: self.digest.readme_limit,
            max_file_bytes: (self.digest.max_file_bytes > 0).then_some(self.digest.max_file_bytes),
            extensions: self.digest.extensions.clone(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout_secs: REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            char_budget: DEFAULT_CHAR_BUDGET,
            readme_limit: README_LIMIT,
            max_file_bytes: MAX_FILE_BYTES,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}
