//! HTTP request executor
//!
//! Sends one authenticated request per call and classifies the outcome:
//! - Bearer token authentication with a fixed client identifier
//! - Hard per-request timeout
//! - Rate-limit wait (`Retry-After`, capped) before surfacing a retryable
//!   error, skipped on the final attempt
//! - Every error message redacted before it leaves this module

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

use super::retry::Attempt;
use crate::config::ClientConfig;
use crate::error::{MemoryError, Result};
use crate::redact::SecretRedactor;

/// Client identifier sent with every request
pub const CLIENT_NAME: &str = "memory-bridge-mcp";

/// Header carrying [`CLIENT_NAME`]
const CLIENT_NAME_HEADER: &str = "x-client-name";

/// Wait used when a 429 carries no usable `Retry-After`
pub const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_millis(5000);

/// Upper bound on any single rate-limit wait
pub const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);

/// Executes single requests against the memory service
pub struct HttpExecutor {
    http: reqwest::Client,
    config: ClientConfig,
    redactor: SecretRedactor,
}

impl HttpExecutor {
    /// Build the executor and its underlying HTTP client
    pub fn new(config: ClientConfig) -> Result<Self> {
        let redactor = config.redactor();

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key()))
            .map_err(|_| MemoryError::Config("API key contains invalid header characters".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(CLIENT_NAME_HEADER),
            HeaderValue::from_static(CLIENT_NAME),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("memory-bridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MemoryError::Config(redactor.redact(&format!("Failed to create HTTP client: {}", e))))?;

        Ok(Self {
            http,
            config,
            redactor,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn redactor(&self) -> &SecretRedactor {
        &self.redactor
    }

    /// Full URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    /// Send one request and return the parsed JSON body.
    ///
    /// An empty success body yields `Value::Null`. `attempt` tells the
    /// executor whether a retry can follow; use [`Attempt::single`] for
    /// standalone calls.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        attempt: Attempt,
    ) -> Result<Value> {
        let url = self.url(path);
        tracing::debug!(method = %method, path = path, attempt = attempt.index, "Sending request");

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .timeout(self.config.timeout());
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.classify_send_error(e))?;
        let status = response.status();
        tracing::debug!(method = %method, path = path, status = status.as_u16(), "Received response");

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(self.wait_for_rate_limit(response, attempt).await);
        }

        if !status.is_success() {
            return Err(self.error_from_response(response).await);
        }

        let text = response.text().await.map_err(|e| self.classify_send_error(e))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| MemoryError::parse(e, &self.redactor))
    }

    fn classify_send_error(&self, err: reqwest::Error) -> MemoryError {
        if err.is_timeout() {
            MemoryError::Timeout {
                timeout_ms: self.config.timeout().as_millis() as u64,
            }
        } else {
            MemoryError::network(err, &self.redactor)
        }
    }

    /// Sleep for the server-requested interval, then report a retryable error.
    ///
    /// The final attempt returns at once since no retry would use the wait.
    async fn wait_for_rate_limit(&self, response: Response, attempt: Attempt) -> MemoryError {
        let header = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok());
        let wait = if attempt.is_last {
            Duration::ZERO
        } else {
            rate_limit_wait(header)
        };

        if !wait.is_zero() {
            tracing::warn!(wait_ms = wait.as_millis() as u64, "Rate limited, waiting before retry");
            tokio::time::sleep(wait).await;
        } else {
            tracing::warn!(attempt = attempt.index, "Rate limited");
        }

        let message = self.redactor.redact(&format!(
            "API request failed: 429 {}",
            StatusCode::TOO_MANY_REQUESTS.canonical_reason().unwrap_or_default()
        ));
        MemoryError::RateLimited {
            waited_ms: wait.as_millis() as u64,
            message,
        }
    }

    async fn error_from_response(&self, response: Response) -> MemoryError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = error_message_from_body(&body);
        MemoryError::api(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            detail.as_deref(),
            &self.redactor,
        )
    }
}

/// Wait for a 429: parsed `Retry-After`, else the default, never above
/// [`MAX_RATE_LIMIT_WAIT`]
pub fn rate_limit_wait(retry_after: Option<&str>) -> Duration {
    retry_after
        .and_then(parse_retry_after)
        .unwrap_or(DEFAULT_RATE_LIMIT_WAIT)
        .min(MAX_RATE_LIMIT_WAIT)
}

/// Parse `Retry-After` as whole seconds
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Extract a human-readable message from a JSON error body.
///
/// Looks at `message`, then `error` as a string, then `error.message`.
fn error_message_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| value.get("error").and_then(Value::as_str))
        .or_else(|| {
            value
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
        })
        .map(str::to_string)
}
