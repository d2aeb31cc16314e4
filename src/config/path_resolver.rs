//! Path resolution for configuration files
//!
//! - Tilde (~) expansion to home directory
//! - Relative paths resolved from the current directory
//! - XDG Base Directory lookup for the config directory

use std::path::PathBuf;

use crate::error::{MemoryError, Result};

/// Application directory name under the XDG config home
pub const APP_DIR_NAME: &str = "memory-bridge";

/// Expand tilde (~) in path to home directory
pub fn expand_home(path: &str) -> Result<PathBuf> {
    if let Some(stripped) = path.strip_prefix('~') {
        let home = std::env::var("HOME")
            .map_err(|_| MemoryError::Config("HOME environment variable not set".to_string()))?;
        if stripped.is_empty() {
            Ok(PathBuf::from(home))
        } else if stripped.starts_with('/') {
            Ok(PathBuf::from(format!("{}{}", home, stripped)))
        } else {
            // ~username format not supported, return as-is
            Ok(PathBuf::from(path))
        }
    } else {
        Ok(PathBuf::from(path))
    }
}

/// Resolve a path to an absolute path
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded = expand_home(path)?;

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        let current_dir = std::env::current_dir().map_err(|e| {
            MemoryError::Config(format!("Failed to get current directory: {}", e))
        })?;
        Ok(current_dir.join(expanded))
    }
}

/// Returns: $XDG_CONFIG_HOME/memory-bridge or ~/.config/memory-bridge
pub fn get_config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join(APP_DIR_NAME)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config").join(APP_DIR_NAME)
    } else {
        PathBuf::from(".config").join(APP_DIR_NAME)
    }
}

/// Get the default config file path
pub fn get_default_config_path() -> PathBuf {
    get_config_dir().join("config.toml")
}
