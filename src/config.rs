use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub walker: WalkerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the code-hosting API. Tests point this at a mock server.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How many quota-exhaustion waits to tolerate per request before
    /// giving up on it.
    #[serde(default = "default_max_rate_limit_waits")]
    pub max_rate_limit_waits: u32,
    /// Cap on in-flight HTTP requests during the walk.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Whole-run deadline in seconds; 0 disables it.
    #[serde(default)]
    pub deadline_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_rate_limit_waits: default_max_rate_limit_waits(),
            max_concurrency: default_max_concurrency(),
            deadline_secs: 0,
        }
    }
}

fn default_base_url() -> String {
    "https://api.github.com".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_rate_limit_waits() -> u32 {
    3
}
fn default_max_concurrency() -> usize {
    8
}

#[derive(Debug, Deserialize, Clone)]
pub struct WalkerConfig {
    /// Files larger than this (bytes) are listed but never content-fetched.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_max_file_size() -> u64 {
    500_000
}

/// Load and validate a config file. A missing file yields pure defaults so
/// the CLI works with no setup.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.api.base_url.trim().is_empty() {
        anyhow::bail!("api.base_url must not be empty");
    }

    if config.api.timeout_secs == 0 {
        anyhow::bail!("api.timeout_secs must be > 0");
    }

    if config.api.max_concurrency == 0 {
        anyhow::bail!("api.max_concurrency must be > 0");
    }

    if config.walker.max_file_size == 0 {
        anyhow::bail!("walker.max_file_size must be > 0");
    }

    Ok(config)
}
