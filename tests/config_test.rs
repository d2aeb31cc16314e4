//! Configuration tests
//!
//! 1. Load config from TOML file
//! 2. Environment variable override
//! 3. Default values
//! 4. Priority: CLI > ENV > Config > Default

use memory_bridge::config::app_config::{AppConfig, LogLevel};
use memory_bridge::config::client_config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
use std::collections::HashMap;
use std::time::Duration;
use tempfile::TempDir;

const LIVE_KEY: &str = "mem_live_abcdefghijklmnopqrstuvwxyz012345";

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();
    assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    assert_eq!(config.timeout_ms(), DEFAULT_TIMEOUT_MS);
    assert_eq!(config.log_level(), LogLevel::Info);
    assert_eq!(config.agent_id(), None);
}

#[test]
fn test_load_from_toml() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    std::fs::write(
        &config_path,
        format!(
            r#"
api_key = "{}"
base_url = "http://localhost:8080"
agent_id = "planner"
timeout_ms = 5000
log_level = "debug"
"#,
            LIVE_KEY
        ),
    )
    .unwrap();

    let config = AppConfig::from_file(&config_path).unwrap();
    assert!(config.has_api_key());
    assert_eq!(config.base_url(), "http://localhost:8080");
    assert_eq!(config.agent_id(), Some("planner"));
    assert_eq!(config.timeout_ms(), 5000);
    assert_eq!(config.log_level(), LogLevel::Debug);
}

#[test]
fn test_partial_toml_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "agent_id = \"scout\"\n").unwrap();

    let config = AppConfig::from_file(&config_path).unwrap();
    assert_eq!(config.agent_id(), Some("scout"));
    assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    assert_eq!(config.timeout_ms(), DEFAULT_TIMEOUT_MS);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "timeout_ms = \"later\"").unwrap();

    let err = AppConfig::from_file(&config_path).unwrap_err();
    assert_eq!(err.kind(), "config_error");
}

#[test]
fn test_env_lookup() {
    let config = AppConfig::from_lookup(env_from(&[
        ("MEMORY_API_KEY", LIVE_KEY),
        ("MEMORY_API_URL", "http://127.0.0.1:9000"),
        ("MEMORY_TIMEOUT_MS", "1500"),
        ("MEMORY_LOG_LEVEL", "warn"),
    ]))
    .unwrap();

    assert!(config.has_api_key());
    assert_eq!(config.base_url(), "http://127.0.0.1:9000");
    assert_eq!(config.timeout_ms(), 1500);
    assert_eq!(config.log_level(), LogLevel::Warn);
}

#[test]
fn test_blank_env_values_ignored() {
    let config = AppConfig::from_lookup(env_from(&[("MEMORY_API_URL", "  ")])).unwrap();
    assert_eq!(config.base_url(), DEFAULT_BASE_URL);
}

#[test]
fn test_merge_priority() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    std::fs::write(
        &config_path,
        r#"
base_url = "http://file.example"
agent_id = "from-file"
timeout_ms = 7000
"#,
    )
    .unwrap();

    let file_config = AppConfig::from_file(&config_path).unwrap();
    let env_config = AppConfig::from_lookup(env_from(&[("MEMORY_AGENT_ID", "from-env")])).unwrap();
    let merged = file_config.merge_with(&env_config);

    // ENV should override file
    assert_eq!(merged.agent_id(), Some("from-env"));
    // File values should be preserved where ENV is not set
    assert_eq!(merged.base_url(), "http://file.example");
    assert_eq!(merged.timeout_ms(), 7000);
}

#[test]
fn test_config_with_cli_override() {
    let config = AppConfig::default()
        .with_base_url("http://cli.example")
        .with_agent_id("cli-agent")
        .with_timeout_ms(250);

    assert_eq!(config.base_url(), "http://cli.example");
    assert_eq!(config.agent_id(), Some("cli-agent"));
    assert_eq!(config.timeout_ms(), 250);
}

#[test]
fn test_validate_rejects_bad_keys() {
    for key in ["sk-abcdefghijklmnopqrstuvwxyz0123456", "mem_live_short"] {
        let config = AppConfig::from_lookup(env_from(&[("MEMORY_API_KEY", key)])).unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), "config_error");
        assert!(!err.to_string().contains(key));
    }
}

#[test]
fn test_validate_rejects_bad_url() {
    let config = AppConfig::from_lookup(env_from(&[
        ("MEMORY_API_KEY", LIVE_KEY),
        ("MEMORY_API_URL", "ftp://files.example"),
    ]))
    .unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_zero_timeout() {
    let config = AppConfig::from_lookup(env_from(&[("MEMORY_API_KEY", LIVE_KEY)]))
        .unwrap()
        .with_timeout_ms(0);
    assert!(config.validate().is_err());
}

#[test]
fn test_client_config_from_valid_settings() {
    let config = AppConfig::from_lookup(env_from(&[
        ("MEMORY_API_KEY", LIVE_KEY),
        ("MEMORY_API_URL", "http://localhost:8080/"),
        ("AGENT_NAME", "writer"),
        ("MEMORY_TIMEOUT_MS", "2000"),
    ]))
    .unwrap();

    let client = config.client_config().unwrap();
    assert_eq!(client.api_key(), LIVE_KEY);
    assert_eq!(client.base_url(), "http://localhost:8080");
    assert_eq!(client.agent_id(), "writer");
    assert_eq!(client.timeout(), Duration::from_millis(2000));
}

#[test]
fn test_debug_output_redacts_key() {
    let config = AppConfig::from_lookup(env_from(&[("MEMORY_API_KEY", LIVE_KEY)])).unwrap();
    let debug = format!("{:?}", config);
    assert!(!debug.contains(LIVE_KEY));
    assert!(debug.contains("mem_live***"));

    let client_debug = format!("{:?}", config.client_config().unwrap());
    assert!(!client_debug.contains(LIVE_KEY));
}

#[test]
fn test_to_toml_round_trip_omits_missing_key() {
    let toml = AppConfig::default().to_toml().unwrap();
    assert!(toml.contains("base_url"));
    assert!(toml.contains("timeout_ms"));
    assert!(!toml.contains("api_key"));
}
