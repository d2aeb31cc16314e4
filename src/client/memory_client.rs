//! Memory and entity operations
//!
//! Each operation validates its input locally, then performs one logical
//! request through the executor under the retry policy.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::executor::HttpExecutor;
use super::retry::RetryPolicy;
use super::types::{
    CreateEntityRequest, Entity, EntityType, HealthStatus, LinkEntityRequest, ListResponse,
    Memory, MemoryUpdate, Metadata, SearchRequest, SearchResponse, SearchResult,
    StoreMemoryRequest, DEFAULT_RELATIONSHIP,
};
use super::validate::{ensure_within_limit, validate_uuid};
use crate::config::ClientConfig;
use crate::error::{MemoryError, Result};
use crate::redact::SecretRedactor;

/// Memory service client
pub struct MemoryClient {
    executor: HttpExecutor,
    retry: RetryPolicy,
}

impl MemoryClient {
    /// Create a client with the default retry policy
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            executor: HttpExecutor::new(config)?,
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        self.executor.config()
    }

    pub fn redactor(&self) -> &SecretRedactor {
        self.executor.redactor()
    }

    fn agent_id(&self) -> &str {
        self.executor.config().agent_id()
    }

    /// One logical call: executor request wrapped in the retry policy
    async fn call(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let body = body.as_ref();
        self.retry
            .run(move |attempt| self.executor.request(method.clone(), path, body, attempt))
            .await
    }

    async fn call_typed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T> {
        let value = self.call(method, path, body).await?;
        serde_json::from_value(value).map_err(|e| MemoryError::parse(e, self.redactor()))
    }

    fn to_body<B: Serialize>(&self, body: &B) -> Result<Value> {
        serde_json::to_value(body).map_err(|e| MemoryError::parse(e, self.redactor()))
    }

    // =========================================================================
    // Memories
    // =========================================================================

    /// Store a new memory
    pub async fn store_memory(&self, content: &str, metadata: Option<&Metadata>) -> Result<Memory> {
        ensure_within_limit("content", content)?;
        let body = self.to_body(&StoreMemoryRequest {
            content,
            metadata,
            agent_id: self.agent_id(),
        })?;
        self.call_typed(Method::POST, "/v1/memories", Some(body)).await
    }

    /// Semantic search over memories
    pub async fn search_memories(
        &self,
        query: &str,
        limit: u32,
        threshold: f64,
    ) -> Result<Vec<SearchResult>> {
        ensure_within_limit("query", query)?;
        let body = self.to_body(&SearchRequest {
            query,
            limit,
            threshold,
            agent_id: self.agent_id(),
        })?;
        let response: SearchResponse = self
            .call_typed(Method::POST, "/v1/memories/search", Some(body))
            .await?;
        Ok(response.results)
    }

    /// List memories (server-defined order, newest first)
    pub async fn list_memories(&self, limit: u32, offset: u32) -> Result<ListResponse<Memory>> {
        let path = format!("/v1/memories?limit={}&offset={}", limit, offset);
        self.call_typed(Method::GET, &path, None).await
    }

    /// Fetch one memory by id
    pub async fn get_memory(&self, id: &str) -> Result<Memory> {
        validate_uuid("memory_id", id)?;
        self.call_typed(Method::GET, &format!("/v1/memories/{}", id), None)
            .await
    }

    /// Replace content and/or metadata of a memory
    pub async fn update_memory(&self, id: &str, update: &MemoryUpdate) -> Result<Memory> {
        validate_uuid("memory_id", id)?;
        if update.is_empty() {
            return Err(MemoryError::Validation(
                "update requires content or metadata".to_string(),
            ));
        }
        if let Some(content) = &update.content {
            ensure_within_limit("content", content)?;
        }
        let body = self.to_body(update)?;
        self.call_typed(Method::PATCH, &format!("/v1/memories/{}", id), Some(body))
            .await
    }

    /// Delete a memory
    pub async fn delete_memory(&self, id: &str) -> Result<()> {
        validate_uuid("memory_id", id)?;
        self.call(Method::DELETE, &format!("/v1/memories/{}", id), None)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Create an entity. `name` is expected to be escaped already.
    pub async fn create_entity(
        &self,
        name: &str,
        entity_type: EntityType,
        metadata: Option<&Metadata>,
    ) -> Result<Entity> {
        ensure_within_limit("name", name)?;
        let body = self.to_body(&CreateEntityRequest {
            name,
            entity_type,
            metadata,
        })?;
        self.call_typed(Method::POST, "/v1/entities", Some(body)).await
    }

    /// Link an entity to a memory
    pub async fn link_entity(
        &self,
        entity_id: &str,
        memory_id: &str,
        relationship: Option<&str>,
    ) -> Result<()> {
        validate_uuid("entity_id", entity_id)?;
        validate_uuid("memory_id", memory_id)?;
        let body = self.to_body(&LinkEntityRequest {
            entity_id,
            memory_id,
            relationship: relationship.unwrap_or(DEFAULT_RELATIONSHIP),
        })?;
        self.call(Method::POST, "/v1/entities/links", Some(body))
            .await?;
        Ok(())
    }

    /// Fetch one entity by id
    pub async fn get_entity(&self, id: &str) -> Result<Entity> {
        validate_uuid("entity_id", id)?;
        self.call_typed(Method::GET, &format!("/v1/entities/{}", id), None)
            .await
    }

    /// List entities
    pub async fn list_entities(&self, limit: u32, offset: u32) -> Result<ListResponse<Entity>> {
        let path = format!("/v1/entities?limit={}&offset={}", limit, offset);
        self.call_typed(Method::GET, &path, None).await
    }

    /// Delete an entity
    pub async fn delete_entity(&self, id: &str) -> Result<()> {
        validate_uuid("entity_id", id)?;
        self.call(Method::DELETE, &format!("/v1/entities/{}", id), None)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Check service health. Failures are reported as an unhealthy status.
    pub async fn health_check(&self) -> HealthStatus {
        match self.call(Method::GET, "/health", None).await {
            Ok(value) => health_from_value(value),
            Err(e) => {
                tracing::warn!("Health check failed: {}", e);
                HealthStatus::unhealthy(format!("Health check failed: {}", e))
            }
        }
    }
}

fn health_from_value(value: Value) -> HealthStatus {
    let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
    HealthStatus {
        status: field("status").unwrap_or_else(|| "healthy".to_string()),
        message: field("message"),
        version: field("version"),
    }
}
