//! Tool catalog and dispatch
//!
//! The fixed set of MCP tools, their argument types, and the dispatcher that
//! maps a tool call onto a memory service operation.

mod dispatch;
pub mod params;

pub use dispatch::{ErrorPayload, ToolDispatcher, ToolOutcome};

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::MemoryError;

/// Tools exposed over MCP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    MemoryStore,
    MemorySearch,
    MemoryList,
    MemoryGet,
    MemoryUpdate,
    MemoryDelete,
    EntityCreate,
    EntityLink,
    MemoryHealth,
}

impl ToolName {
    pub const ALL: [ToolName; 9] = [
        ToolName::MemoryStore,
        ToolName::MemorySearch,
        ToolName::MemoryList,
        ToolName::MemoryGet,
        ToolName::MemoryUpdate,
        ToolName::MemoryDelete,
        ToolName::EntityCreate,
        ToolName::EntityLink,
        ToolName::MemoryHealth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::MemoryStore => "memory_store",
            ToolName::MemorySearch => "memory_search",
            ToolName::MemoryList => "memory_list",
            ToolName::MemoryGet => "memory_get",
            ToolName::MemoryUpdate => "memory_update",
            ToolName::MemoryDelete => "memory_delete",
            ToolName::EntityCreate => "entity_create",
            ToolName::EntityLink => "entity_link",
            ToolName::MemoryHealth => "memory_health",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolName::MemoryStore => "Store a new memory with optional metadata",
            ToolName::MemorySearch => "Search memories by semantic similarity",
            ToolName::MemoryList => "List stored memories, newest first",
            ToolName::MemoryGet => "Get a memory by id",
            ToolName::MemoryUpdate => "Replace the content and/or metadata of a memory",
            ToolName::MemoryDelete => "Delete a memory by id",
            ToolName::EntityCreate => {
                "Create an entity (person, place, organization, project, concept, other)"
            }
            ToolName::EntityLink => "Link an entity to a memory",
            ToolName::MemoryHealth => "Check memory service health",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| MemoryError::UnknownTool(s.to_string()))
    }
}

/// Catalog entry for listings
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// The full tool catalog
pub fn catalog() -> Vec<ToolInfo> {
    ToolName::ALL
        .iter()
        .map(|t| ToolInfo {
            name: t.as_str(),
            description: t.description(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_name_round_trip() {
        for tool in ToolName::ALL {
            assert_eq!(tool.as_str().parse::<ToolName>().unwrap(), tool);
        }
    }

    #[test]
    fn test_unknown_tool() {
        let err = "memory_explode".parse::<ToolName>().unwrap_err();
        assert!(matches!(err, MemoryError::UnknownTool(ref name) if name == "memory_explode"));
        assert!(err.to_string().contains("memory_explode"));
    }

    #[test]
    fn test_catalog_has_all_tools() {
        let names: Vec<_> = catalog().iter().map(|t| t.name).collect();
        assert_eq!(names.len(), 9);
        assert!(names.contains(&"entity_link"));
        assert!(names.contains(&"memory_health"));
    }
}
