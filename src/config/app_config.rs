//! Application configuration
//!
//! TOML-based configuration with environment variable override support.
//! Priority: CLI args > Environment variables > Config file > Defaults

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use super::client_config::{
    derive_agent_id, local_hostname, validate_api_key, validate_base_url, ClientConfig,
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS,
};
use crate::error::{MemoryError, Result};
use crate::redact::SecretRedactor;

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(MemoryError::Config(format!(
                "Invalid log level '{}'. Valid levels: error, warn, info, debug, trace",
                other
            ))),
        }
    }
}

/// Application configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Memory service API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,

    /// Memory service base URL
    #[serde(default = "default_base_url")]
    base_url: String,

    /// Agent identifier attached to stored memories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agent_id: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,

    /// Log verbosity
    #[serde(default)]
    log_level: LogLevel,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            agent_id: None,
            timeout_ms: default_timeout_ms(),
            log_level: LogLevel::default(),
        }
    }
}

impl AppConfig {
    /// Create config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MemoryError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content)
            .map_err(|e| MemoryError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Create config from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    ///
    /// Agent id falls back from `MEMORY_AGENT_ID` to `AGENT_NAME`; the
    /// hostname-derived default is applied later in [`Self::client_config`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(api_key) = var("MEMORY_API_KEY") {
            config.api_key = Some(api_key.trim().to_string());
        }

        if let Some(base_url) = var("MEMORY_API_URL") {
            config.base_url = base_url.trim().to_string();
        }

        if let Some(agent_id) = var("MEMORY_AGENT_ID").or_else(|| var("AGENT_NAME")) {
            config.agent_id = Some(agent_id.trim().to_string());
        }

        if let Some(timeout) = var("MEMORY_TIMEOUT_MS") {
            config.timeout_ms = timeout.trim().parse().map_err(|_| {
                MemoryError::Config(format!(
                    "MEMORY_TIMEOUT_MS must be a positive integer, got '{}'",
                    timeout
                ))
            })?;
        }

        if let Some(level) = var("MEMORY_LOG_LEVEL") {
            config.log_level = level.parse()?;
        }

        Ok(config)
    }

    /// Merge with another config (other takes priority for non-default values)
    pub fn merge_with(&self, other: &Self) -> Self {
        Self {
            api_key: other.api_key.clone().or_else(|| self.api_key.clone()),
            base_url: if other.base_url != default_base_url() {
                other.base_url.clone()
            } else {
                self.base_url.clone()
            },
            agent_id: other.agent_id.clone().or_else(|| self.agent_id.clone()),
            timeout_ms: if other.timeout_ms != default_timeout_ms() {
                other.timeout_ms
            } else {
                self.timeout_ms
            },
            log_level: if other.log_level != LogLevel::default() {
                other.log_level
            } else {
                self.log_level
            },
        }
    }

    /// Override base_url
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Override agent_id
    pub fn with_agent_id(mut self, agent_id: &str) -> Self {
        self.agent_id = Some(agent_id.to_string());
        self
    }

    /// Override timeout_ms
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Validate configuration. Error messages never include the key.
    pub fn validate(&self) -> Result<()> {
        validate_api_key(self.api_key.as_deref().unwrap_or_default())?;
        validate_base_url(&self.base_url)?;

        if self.timeout_ms == 0 {
            return Err(MemoryError::Config(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }

        if let Some(agent_id) = &self.agent_id {
            if agent_id.chars().count() > 128 {
                return Err(MemoryError::Config(
                    "agent_id must be at most 128 characters".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Validate and build the immutable client configuration
    pub fn client_config(&self) -> Result<ClientConfig> {
        self.validate()?;
        let agent_id = self
            .agent_id
            .clone()
            .unwrap_or_else(|| derive_agent_id(&local_hostname()));
        Ok(ClientConfig::new(
            self.api_key.clone().unwrap_or_default(),
            self.base_url.clone(),
            agent_id,
            Duration::from_millis(self.timeout_ms),
        ))
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| MemoryError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Redactor for the configured key (identity when no key is set)
    pub fn redactor(&self) -> SecretRedactor {
        self.api_key
            .as_deref()
            .map(SecretRedactor::new)
            .unwrap_or_default()
    }

    // Getters
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn agent_id(&self) -> Option<&str> {
        self.agent_id.as_deref()
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key.as_ref().map(|k| self.redactor().redact(k)))
            .field("base_url", &self.base_url)
            .field("agent_id", &self.agent_id)
            .field("timeout_ms", &self.timeout_ms)
            .field("log_level", &self.log_level)
            .finish()
    }
}
