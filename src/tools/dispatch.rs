//! Tool dispatcher
//!
//! Validates and sanitizes tool arguments, calls the memory client, and turns
//! every outcome into either a JSON result or a structured error payload.
//! Nothing here propagates an error to the transport.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use super::params::{
    CreateEntityParams, LinkEntityParams, ListMemoriesParams, MemoryIdParams,
    SearchMemoriesParams, StoreMemoryParams, UpdateMemoryParams,
};
use super::ToolName;
use crate::client::types::DEFAULT_RELATIONSHIP;
use crate::client::MemoryClient;
use crate::error::{MemoryError, Result};
use crate::redact::SecretRedactor;

/// Structured error returned to the tool caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorPayload {
    /// Build a payload from an error, sanitizing the message again
    pub fn from_error(err: &MemoryError, redactor: &SecretRedactor) -> Self {
        Self {
            error: err.kind().to_string(),
            message: redactor.sanitize(&err.to_string()),
            details: err.status().map(|status| json!({ "status": status })),
        }
    }
}

/// Result of one tool call
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Success(Value),
    Failure(ErrorPayload),
}

impl ToolOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, ToolOutcome::Failure(_))
    }

    /// Pretty-printed JSON text for the MCP content block
    pub fn to_text(&self) -> String {
        let value = match self {
            ToolOutcome::Success(value) => value.clone(),
            ToolOutcome::Failure(payload) => json!(payload),
        };
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
    }
}

/// Maps tool calls onto memory client operations
pub struct ToolDispatcher {
    client: MemoryClient,
}

impl ToolDispatcher {
    pub fn new(client: MemoryClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &MemoryClient {
        &self.client
    }

    /// Dispatch by tool name with a raw JSON argument bag
    pub async fn dispatch(&self, name: &str, args: Value) -> ToolOutcome {
        let tool = match name.parse::<ToolName>() {
            Ok(tool) => tool,
            Err(e) => {
                tracing::warn!("Rejected call to unknown tool '{}'", name);
                return self.failure(e);
            }
        };

        // Absent arguments behave like an empty object
        let args = if args.is_null() { json!({}) } else { args };

        match tool {
            ToolName::MemoryStore => match parse_args(tool, args) {
                Ok(params) => self.memory_store(params).await,
                Err(e) => self.failure(e),
            },
            ToolName::MemorySearch => match parse_args(tool, args) {
                Ok(params) => self.memory_search(params).await,
                Err(e) => self.failure(e),
            },
            ToolName::MemoryList => match parse_args(tool, args) {
                Ok(params) => self.memory_list(params).await,
                Err(e) => self.failure(e),
            },
            ToolName::MemoryGet => match parse_args(tool, args) {
                Ok(params) => self.memory_get(params).await,
                Err(e) => self.failure(e),
            },
            ToolName::MemoryUpdate => match parse_args(tool, args) {
                Ok(params) => self.memory_update(params).await,
                Err(e) => self.failure(e),
            },
            ToolName::MemoryDelete => match parse_args(tool, args) {
                Ok(params) => self.memory_delete(params).await,
                Err(e) => self.failure(e),
            },
            ToolName::EntityCreate => match parse_args(tool, args) {
                Ok(params) => self.entity_create(params).await,
                Err(e) => self.failure(e),
            },
            ToolName::EntityLink => match parse_args(tool, args) {
                Ok(params) => self.entity_link(params).await,
                Err(e) => self.failure(e),
            },
            ToolName::MemoryHealth => self.memory_health().await,
        }
    }

    pub async fn memory_store(&self, params: StoreMemoryParams) -> ToolOutcome {
        let result: Result<Value> = async {
            let params = params.sanitized()?;
            let memory = self
                .client
                .store_memory(&params.content, params.metadata.as_ref())
                .await?;
            to_json(&memory)
        }
        .await;
        self.finish(ToolName::MemoryStore, result)
    }

    pub async fn memory_search(&self, params: SearchMemoriesParams) -> ToolOutcome {
        let result: Result<Value> = async {
            let params = params.sanitized()?;
            let results = self
                .client
                .search_memories(&params.query, params.limit, params.threshold)
                .await?;
            Ok(json!({ "count": results.len(), "results": to_json(&results)? }))
        }
        .await;
        self.finish(ToolName::MemorySearch, result)
    }

    pub async fn memory_list(&self, params: ListMemoriesParams) -> ToolOutcome {
        let result: Result<Value> = async {
            params.validate()?;
            let list = self.client.list_memories(params.limit, params.offset).await?;
            to_json(&list)
        }
        .await;
        self.finish(ToolName::MemoryList, result)
    }

    pub async fn memory_get(&self, params: MemoryIdParams) -> ToolOutcome {
        let result: Result<Value> = async {
            let memory = self.client.get_memory(params.id.trim()).await?;
            to_json(&memory)
        }
        .await;
        self.finish(ToolName::MemoryGet, result)
    }

    pub async fn memory_update(&self, params: UpdateMemoryParams) -> ToolOutcome {
        let result: Result<Value> = async {
            let params = params.sanitized()?;
            let memory = self
                .client
                .update_memory(&params.id, &params.to_update())
                .await?;
            to_json(&memory)
        }
        .await;
        self.finish(ToolName::MemoryUpdate, result)
    }

    pub async fn memory_delete(&self, params: MemoryIdParams) -> ToolOutcome {
        let result: Result<Value> = async {
            let id = params.id.trim();
            self.client.delete_memory(id).await?;
            Ok(json!({ "deleted": true, "id": id }))
        }
        .await;
        self.finish(ToolName::MemoryDelete, result)
    }

    pub async fn entity_create(&self, params: CreateEntityParams) -> ToolOutcome {
        let result: Result<Value> = async {
            let params = params.sanitized()?;
            let entity = self
                .client
                .create_entity(&params.name, params.entity_type, params.metadata.as_ref())
                .await?;
            to_json(&entity)
        }
        .await;
        self.finish(ToolName::EntityCreate, result)
    }

    pub async fn entity_link(&self, params: LinkEntityParams) -> ToolOutcome {
        let result: Result<Value> = async {
            let params = params.sanitized();
            let relationship = params.relationship.as_deref();
            self.client
                .link_entity(&params.entity_id, &params.memory_id, relationship)
                .await?;
            Ok(json!({
                "linked": true,
                "entity_id": params.entity_id,
                "memory_id": params.memory_id,
                "relationship": relationship.unwrap_or(DEFAULT_RELATIONSHIP),
            }))
        }
        .await;
        self.finish(ToolName::EntityLink, result)
    }

    pub async fn memory_health(&self) -> ToolOutcome {
        let status = self.client.health_check().await;
        self.finish(ToolName::MemoryHealth, to_json(&status))
    }

    fn finish(&self, tool: ToolName, result: Result<Value>) -> ToolOutcome {
        match result {
            Ok(value) => {
                tracing::info!(tool = tool.as_str(), "Tool call succeeded");
                ToolOutcome::Success(value)
            }
            Err(e) => {
                tracing::warn!(tool = tool.as_str(), kind = e.kind(), "Tool call failed: {}", e);
                self.failure(e)
            }
        }
    }

    fn failure(&self, err: MemoryError) -> ToolOutcome {
        ToolOutcome::Failure(ErrorPayload::from_error(&err, self.client.redactor()))
    }
}

fn parse_args<T: DeserializeOwned>(tool: ToolName, args: Value) -> Result<T> {
    serde_json::from_value(args)
        .map_err(|e| MemoryError::Validation(format!("Invalid arguments for {}: {}", tool, e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| MemoryError::Parse(e.to_string()))
}
