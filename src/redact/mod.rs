//! Secret redaction
//!
//! Two independent passes:
//!
//! - [`redact`] replaces a known secret value wherever it appears. This is the
//!   only sound guarantee and is applied wherever the API key is in scope.
//! - [`scrub_log_text`] is a best-effort heuristic for text where the key is
//!   not in scope: key-shaped tokens, bearer tokens, filesystem paths and
//!   source locations are masked. It is not a security boundary.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker appended to the visible prefix of a redacted secret
pub const REDACTION_MARKER: &str = "***";

/// Number of leading secret characters kept visible
const VISIBLE_PREFIX_CHARS: usize = 8;

/// Mask used by the heuristic scrub after a recognized prefix
const KEY_MASK: &str = "****";

static API_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(mem_(?:live|test)_)[A-Za-z0-9_-]+").expect("Invalid regex"));

static BEARER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(Bearer\s+)[A-Za-z0-9._~+/-]+=*").expect("Invalid regex"));

static SOURCE_LOCATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9_./\\-]+\.(?:rs|js|mjs|ts|py):\d+(?::\d+)?").expect("Invalid regex")
});

static UNIX_PATH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/(?:home|Users|root|tmp|var|usr|opt|etc|private|mnt|srv)(?:/[A-Za-z0-9_.@-]+)+/?")
        .expect("Invalid regex")
});

static WINDOWS_PATH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z]:\\[^\s:]+").expect("Invalid regex"));

/// Replace every occurrence of `secret` in `text` with its first 8 characters
/// followed by `***`.
///
/// An empty secret leaves `text` unchanged. Secrets of 8 characters or fewer
/// are replaced by the marker alone so the placeholder never contains them.
pub fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() || !text.contains(secret) {
        return text.to_string();
    }
    text.replace(secret, &placeholder(secret))
}

fn placeholder(secret: &str) -> String {
    if secret.chars().count() <= VISIBLE_PREFIX_CHARS {
        return REDACTION_MARKER.to_string();
    }
    let prefix: String = secret.chars().take(VISIBLE_PREFIX_CHARS).collect();
    format!("{}{}", prefix, REDACTION_MARKER)
}

/// Heuristically mask key-shaped tokens, paths and source locations.
pub fn scrub_log_text(text: &str) -> String {
    let text = API_KEY_PATTERN.replace_all(text, format!("${{1}}{}", KEY_MASK).as_str());
    let text = BEARER_PATTERN.replace_all(&text, format!("${{1}}{}", KEY_MASK).as_str());
    let text = SOURCE_LOCATION_PATTERN.replace_all(&text, "[location]");
    let text = UNIX_PATH_PATTERN.replace_all(&text, "[path]");
    let text = WINDOWS_PATH_PATTERN.replace_all(&text, "[path]");
    text.into_owned()
}

/// Redactor bound to one secret value
#[derive(Clone, Default)]
pub struct SecretRedactor {
    secret: Option<String>,
}

impl SecretRedactor {
    /// Create a redactor for the given secret
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        Self {
            secret: (!secret.is_empty()).then_some(secret),
        }
    }

    /// Redactor with no secret; `redact` is the identity
    pub fn none() -> Self {
        Self::default()
    }

    /// Apply the explicit-secret pass
    pub fn redact(&self, text: &str) -> String {
        match &self.secret {
            Some(secret) => redact(text, secret),
            None => text.to_string(),
        }
    }

    /// Apply the explicit-secret pass followed by the heuristic scrub
    pub fn sanitize(&self, text: &str) -> String {
        scrub_log_text(&self.redact(text))
    }
}

impl std::fmt::Debug for SecretRedactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretRedactor")
            .field("secret", &self.secret.as_ref().map(|_| REDACTION_MARKER))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "mem_live_0123456789abcdefghijklmnop";

    #[test]
    fn test_redact_single_occurrence() {
        let out = redact(&format!("key={}", KEY), KEY);
        assert_eq!(out, "key=mem_live***");
    }

    #[test]
    fn test_redact_multiple_occurrences() {
        let text = format!("{} and again {}", KEY, KEY);
        let out = redact(&text, KEY);
        assert!(!out.contains(KEY));
        assert_eq!(out.matches("mem_live***").count(), 2);
    }

    #[test]
    fn test_redact_empty_secret_is_identity() {
        assert_eq!(redact("nothing to hide", ""), "nothing to hide");
    }

    #[test]
    fn test_redact_no_match() {
        assert_eq!(redact("plain text", KEY), "plain text");
    }

    #[test]
    fn test_redact_is_case_sensitive() {
        let upper = KEY.to_uppercase();
        assert_eq!(redact(&upper, KEY), upper);
    }

    #[test]
    fn test_redact_short_secret_fully_masked() {
        assert_eq!(redact("token=abc123", "abc123"), "token=***");
    }

    #[test]
    fn test_scrub_api_key_prefix() {
        let out = scrub_log_text("using mem_test_SomeSecretValue_42 now");
        assert_eq!(out, "using mem_test_**** now");
    }

    #[test]
    fn test_scrub_bearer_token() {
        let out = scrub_log_text("Authorization: Bearer abc.def-ghi");
        assert_eq!(out, "Authorization: Bearer ****");
    }

    #[test]
    fn test_scrub_paths_and_locations() {
        let out = scrub_log_text("failed reading /home/alice/.config/app/config.toml");
        assert_eq!(out, "failed reading [path]");

        let out = scrub_log_text("panicked at src/client/executor.rs:42:9");
        assert_eq!(out, "panicked at [location]");

        let out = scrub_log_text(r"open C:\Users\bob\secrets.txt");
        assert_eq!(out, "open [path]");
    }

    #[test]
    fn test_scrub_leaves_api_paths_alone() {
        let out = scrub_log_text("POST /v1/memories/search -> 200");
        assert_eq!(out, "POST /v1/memories/search -> 200");
    }

    #[test]
    fn test_redactor_debug_hides_secret() {
        let redactor = SecretRedactor::new(KEY);
        assert!(!format!("{:?}", redactor).contains(KEY));
    }

    #[test]
    fn test_sanitize_applies_both_passes() {
        let redactor = SecretRedactor::new("custom-secret-value-123");
        let out = redactor.sanitize("custom-secret-value-123 at /tmp/x/y");
        assert_eq!(out, "custom-s*** at [path]");
    }
}
