//! MCP server implementation
//!
//! Each catalog tool is exposed through rmcp's tool macros and forwarded to
//! the [`ToolDispatcher`]. Tool failures become error results, never
//! protocol errors.

use rmcp::{
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, ServerHandler,
};
use std::sync::Arc;

use crate::tools::params::{
    CreateEntityParams, LinkEntityParams, ListMemoriesParams, MemoryIdParams,
    SearchMemoriesParams, StoreMemoryParams, UpdateMemoryParams,
};
use crate::tools::{ToolDispatcher, ToolName, ToolOutcome};

/// MCP server for the memory service
#[derive(Clone)]
pub struct MemoryBridgeServer {
    dispatcher: Arc<ToolDispatcher>,
}

/// Convert a dispatcher outcome into an MCP tool result
pub fn into_call_result(outcome: ToolOutcome) -> CallToolResult {
    let content = vec![Content::text(outcome.to_text())];
    if outcome.is_error() {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

#[tool(tool_box)]
impl MemoryBridgeServer {
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Store a new memory
    #[tool(description = ToolName::MemoryStore.description())]
    async fn memory_store(
        &self,
        #[tool(aggr)] params: StoreMemoryParams,
    ) -> Result<CallToolResult, rmcp::Error> {
        Ok(into_call_result(self.dispatcher.memory_store(params).await))
    }

    /// Search memories
    #[tool(description = ToolName::MemorySearch.description())]
    async fn memory_search(
        &self,
        #[tool(aggr)] params: SearchMemoriesParams,
    ) -> Result<CallToolResult, rmcp::Error> {
        Ok(into_call_result(self.dispatcher.memory_search(params).await))
    }

    /// List memories
    #[tool(description = ToolName::MemoryList.description())]
    async fn memory_list(
        &self,
        #[tool(aggr)] params: ListMemoriesParams,
    ) -> Result<CallToolResult, rmcp::Error> {
        Ok(into_call_result(self.dispatcher.memory_list(params).await))
    }

    /// Get a memory
    #[tool(description = ToolName::MemoryGet.description())]
    async fn memory_get(
        &self,
        #[tool(aggr)] params: MemoryIdParams,
    ) -> Result<CallToolResult, rmcp::Error> {
        Ok(into_call_result(self.dispatcher.memory_get(params).await))
    }

    /// Update a memory
    #[tool(description = ToolName::MemoryUpdate.description())]
    async fn memory_update(
        &self,
        #[tool(aggr)] params: UpdateMemoryParams,
    ) -> Result<CallToolResult, rmcp::Error> {
        Ok(into_call_result(self.dispatcher.memory_update(params).await))
    }

    /// Delete a memory
    #[tool(description = ToolName::MemoryDelete.description())]
    async fn memory_delete(
        &self,
        #[tool(aggr)] params: MemoryIdParams,
    ) -> Result<CallToolResult, rmcp::Error> {
        Ok(into_call_result(self.dispatcher.memory_delete(params).await))
    }

    /// Create an entity
    #[tool(description = ToolName::EntityCreate.description())]
    async fn entity_create(
        &self,
        #[tool(aggr)] params: CreateEntityParams,
    ) -> Result<CallToolResult, rmcp::Error> {
        Ok(into_call_result(self.dispatcher.entity_create(params).await))
    }

    /// Link an entity to a memory
    #[tool(description = ToolName::EntityLink.description())]
    async fn entity_link(
        &self,
        #[tool(aggr)] params: LinkEntityParams,
    ) -> Result<CallToolResult, rmcp::Error> {
        Ok(into_call_result(self.dispatcher.entity_link(params).await))
    }

    /// Check service health
    #[tool(description = ToolName::MemoryHealth.description())]
    async fn memory_health(&self) -> Result<CallToolResult, rmcp::Error> {
        Ok(into_call_result(self.dispatcher.memory_health().await))
    }
}

#[tool(tool_box)]
impl ServerHandler for MemoryBridgeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Persistent memory for agents: store, search, list, update and delete memories, \
                 create entities and link them to memories"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
