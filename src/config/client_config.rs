//! Client configuration
//!
//! Immutable settings owned by one [`MemoryClient`](crate::client::MemoryClient).

use std::time::Duration;

use crate::error::{MemoryError, Result};
use crate::redact::SecretRedactor;

/// Production endpoint of the memory service
pub const DEFAULT_BASE_URL: &str = "https://api.memorybridge.dev";

/// Default request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Accepted API key prefixes
pub const API_KEY_PREFIXES: &[&str] = &["mem_live_", "mem_test_"];

/// Minimum API key length (prefix included)
pub const MIN_API_KEY_LEN: usize = 32;

/// Length of the hostname slug used in generated agent ids
const AGENT_SLUG_LEN: usize = 12;

/// Settings for one client instance
#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
    agent_id: String,
    timeout: Duration,
}

impl ClientConfig {
    /// Create a config without validating the key format.
    ///
    /// Use [`AppConfig::client_config`](crate::config::AppConfig::client_config)
    /// for validated construction from the environment.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        agent_id: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent_id: agent_id.into(),
            timeout,
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Redactor bound to this config's API key
    pub fn redactor(&self) -> SecretRedactor {
        SecretRedactor::new(self.api_key.clone())
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.redactor().redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("agent_id", &self.agent_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Check the API key prefix and length. The error never contains the key.
pub fn validate_api_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(MemoryError::Config(
            "MEMORY_API_KEY is required but not set".to_string(),
        ));
    }
    if !API_KEY_PREFIXES.iter().any(|p| key.starts_with(p)) {
        return Err(MemoryError::Config(format!(
            "API key must start with one of {:?}",
            API_KEY_PREFIXES
        )));
    }
    if key.chars().count() < MIN_API_KEY_LEN {
        return Err(MemoryError::Config(format!(
            "API key must be at least {} characters",
            MIN_API_KEY_LEN
        )));
    }
    Ok(())
}

/// Check that the base URL is an absolute http(s) URL
pub fn validate_base_url(base_url: &str) -> Result<()> {
    let url = reqwest::Url::parse(base_url)
        .map_err(|e| MemoryError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(MemoryError::Config(format!(
            "Base URL must use http or https, got '{}'",
            other
        ))),
    }
}

/// Generate an agent id from a hostname: `agent-<slug>` with the slug
/// lowercased, non-alphanumerics collapsed to `-`, and cut to 12 characters.
pub fn derive_agent_id(hostname: &str) -> String {
    let mut slug = String::new();
    for c in hostname.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug: String = slug.chars().take(AGENT_SLUG_LEN).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "agent-local".to_string()
    } else {
        format!("agent-{}", slug)
    }
}

/// Best-effort local hostname (`HOSTNAME`, then `/etc/hostname`)
pub fn local_hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.trim().is_empty())
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
        })
        .unwrap_or_else(|| "localhost".to_string())
}
