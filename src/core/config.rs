//! Client and application configuration
//!
//! `ClientConfig` is what the library needs to build a client. `Config` is
//! the binary's view: an optional TOML file plus environment overrides.

use crate::core::constants::{API_KEY_ENV, DEFAULT_TIMEOUT, PLACEHOLDER_API_KEY, endpoint};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default config file looked up by the binary
const DEFAULT_CONFIG_PATH: &str = "cyberapi.toml";

/// Settings a `ThreatQueryClient` is built from
///
/// The API key is opaque and never validated locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Config for the production endpoint with the default timeout
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: endpoint::DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL with any trailing slashes removed
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSection {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_base_url() -> String {
    endpoint::DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Application configuration for the `cyberapi-check` binary
#[derive(Debug, Clone)]
pub struct Config {
    /// API key sent as `X-API-Key`
    pub api_key: String,

    /// API base URL
    pub base_url: String,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Logging level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default())
    }
}

impl Config {
    fn from_toml(config: TomlConfig) -> Self {
        Config {
            api_key: config
                .api
                .api_key
                .filter(|k| !k.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_API_KEY.to_string()),
            base_url: config.api.base_url,
            request_timeout: config.api.timeout_secs,
            log_level: config.logging.log_level,
        }
    }

    /// Load configuration from TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read configuration file")?;

        let config: TomlConfig =
            toml::from_str(&content).context("Failed to parse TOML configuration")?;

        Ok(Self::from_toml(config))
    }

    /// Load configuration from environment and optional config file
    ///
    /// Reads the file named by `CONFIG_PATH`, then lets `CYBERAPI_KEY`
    /// override the API key. Without `CONFIG_PATH`, `cyberapi.toml` is used
    /// when present and defaults otherwise.
    pub fn from_env() -> Result<Self> {
        Self::load(
            std::env::var("CONFIG_PATH").ok(),
            std::env::var(API_KEY_ENV).ok(),
        )
    }

    /// Load from an explicit config path (which must exist) or the default
    /// one (which may be absent), then apply the API key override
    pub fn load(config_path: Option<String>, api_key: Option<String>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                Self::from_file(&path).with_context(|| format!("Failed to load {}", path))?
            }
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH)
                .with_context(|| format!("Failed to load {}", DEFAULT_CONFIG_PATH))?,
            None => Self::default(),
        };

        Ok(config.with_api_key_override(api_key))
    }

    /// Replace the API key when a non-empty override is given
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.is_empty()) {
            self.api_key = key;
        }
        self
    }

    /// Library-level client settings
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_key.clone())
            .with_base_url(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.request_timeout))
    }
}
