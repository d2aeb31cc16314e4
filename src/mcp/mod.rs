//! MCP server module
//!
//! rmcp-based stdio server exposing the tool catalog.

mod server;

pub use server::{into_call_result, MemoryBridgeServer};
