//! memory-bridge: MCP adapter for a remote memory service
//!
//! Exposes a memory-storage HTTP API as Model Context Protocol tools so an
//! agent runtime can store, search and organize persistent memories and a
//! small entity graph.
//!
//! # Modules
//!
//! - `config`: Application settings (file + environment) and client config
//! - `client`: HTTP executor, retry policy and typed memory/entity operations
//! - `redact`: Secret redaction and best-effort log scrubbing
//! - `logging`: tracing subscriber with a scrubbing writer
//! - `tools`: Tool catalog, argument validation and dispatch
//! - `mcp`: MCP server implementation
//! - `error`: Error types

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod redact;
pub mod tools;

// Re-export commonly used types
pub use client::MemoryClient;
pub use config::{AppConfig, ClientConfig};
pub use error::{MemoryError, Result};
pub use redact::{redact, SecretRedactor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
