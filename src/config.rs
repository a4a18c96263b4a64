//! Configuration for Crosscast
//!
//! The core takes no values from the process environment: configuration is
//! assembled outside (by a CLI or other front-end), either built directly
//! or parsed from a TOML document, and passed by value into platform
//! construction.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub bluesky: Option<BlueskyConfig>,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Bluesky platform credentials and endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueskyConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Handle or DID to log in as (e.g. "alice.bsky.social").
    pub identifier: String,
    /// App password, not the account password.
    pub app_password: String,
    /// PDS base URL.
    #[serde(default = "default_bluesky_service")]
    pub service: String,
}

fn default_enabled() -> bool {
    true
}

fn default_bluesky_service() -> String {
    "https://bsky.social".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Platform ids a front-end should broadcast to when none are named.
    #[serde(default)]
    pub platforms: Vec<String>,
}

impl Config {
    /// Parse configuration from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::from_toml_str(&content)
    }
}
