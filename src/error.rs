//! Error types for the memory service client
//!
//! Every variant carries a message that has already been sanitized, so an
//! error can be logged or returned to a tool caller as-is.

use thiserror::Error;

use crate::redact::SecretRedactor;

/// Memory service errors
#[derive(Debug, Clone, Error)]
pub enum MemoryError {
    /// Local input validation failed (raised before any network call)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Non-success HTTP response from the memory service
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Server asked us to slow down; the wait has already been served
    #[error("{message} (waited {waited_ms} ms)")]
    RateLimited { waited_ms: u64, message: String },

    /// No response within the configured timeout
    #[error("Request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Network error (connection refused, DNS, reset, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be decoded
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tool name outside the fixed catalog
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl MemoryError {
    /// Build an API error for a non-success status.
    ///
    /// The message has the form `API request failed: <status> <reason>[ - <detail>]`
    /// and is redacted before the error value exists.
    pub fn api(
        status: u16,
        reason: &str,
        detail: Option<&str>,
        redactor: &SecretRedactor,
    ) -> Self {
        let mut message = format!("API request failed: {} {}", status, reason);
        if let Some(detail) = detail.filter(|d| !d.is_empty()) {
            message.push_str(" - ");
            message.push_str(detail);
        }
        MemoryError::Api {
            status,
            message: redactor.redact(&message),
        }
    }

    /// Build a network error from any displayable cause, redacted.
    pub fn network(cause: impl std::fmt::Display, redactor: &SecretRedactor) -> Self {
        MemoryError::Network(redactor.redact(&cause.to_string()))
    }

    /// Build a parse error from any displayable cause, redacted.
    pub fn parse(cause: impl std::fmt::Display, redactor: &SecretRedactor) -> Self {
        MemoryError::Parse(redactor.redact(&cause.to_string()))
    }

    /// HTTP status associated with this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            MemoryError::Api { status, .. } => Some(*status),
            MemoryError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Whether the retry loop may attempt the operation again.
    ///
    /// 400/401/403/404 and purely local failures are fatal; everything else
    /// (5xx, 429, timeouts, network and decode failures) is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            MemoryError::Api { status, .. } => !matches!(status, 400 | 401 | 403 | 404),
            MemoryError::Validation(_) | MemoryError::Config(_) | MemoryError::UnknownTool(_) => {
                false
            }
            _ => true,
        }
    }

    /// Whether the retry loop should skip its own backoff before the next attempt
    pub fn already_waited(&self) -> bool {
        matches!(self, MemoryError::RateLimited { .. })
    }

    /// Machine-readable error kind used in tool error payloads
    pub fn kind(&self) -> &'static str {
        match self {
            MemoryError::Validation(_) => "validation_error",
            MemoryError::Api { status: 400, .. } => "bad_request",
            MemoryError::Api {
                status: 401 | 403, ..
            } => "authentication_error",
            MemoryError::Api { status: 404, .. } => "not_found",
            MemoryError::Api { .. } => "api_error",
            MemoryError::RateLimited { .. } => "rate_limited",
            MemoryError::Timeout { .. } => "timeout",
            MemoryError::Network(_) => "network_error",
            MemoryError::Parse(_) => "parse_error",
            MemoryError::Config(_) => "config_error",
            MemoryError::UnknownTool(_) => "unknown_tool",
        }
    }
}

/// Result alias for memory service operations
pub type Result<T> = std::result::Result<T, MemoryError>;
