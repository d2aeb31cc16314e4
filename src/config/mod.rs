//! Configuration module for memory-bridge
//!
//! Application settings (file + environment) and the immutable client config.

pub mod app_config;
pub mod client_config;
pub mod path_resolver;

pub use app_config::{AppConfig, LogLevel};
pub use client_config::ClientConfig;
