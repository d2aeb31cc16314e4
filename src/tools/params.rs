//! Tool argument types
//!
//! Each struct is the declared argument shape of one tool. `sanitized` strips
//! control characters (and escapes entity text) first, then runs `validate` on
//! the cleaned values, so checks always see what is sent to the memory service.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::client::types::{EntityType, Metadata, MemoryUpdate};
use crate::error::{MemoryError, Result};

/// Upper bound for `limit` arguments
pub const MAX_LIMIT: u32 = 100;

/// Maximum entity name length in characters
pub const MAX_ENTITY_NAME_CHARS: usize = 200;

/// Parameters for memory_store
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StoreMemoryParams {
    /// Memory content (max 51200 characters)
    pub content: String,
    /// Optional string key/value metadata
    pub metadata: Option<Metadata>,
}

/// Parameters for memory_search
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchMemoriesParams {
    /// Search query
    pub query: String,
    /// Maximum number of results, 1-100 (default: 10)
    #[serde(default = "default_search_limit")]
    pub limit: u32,
    /// Minimum similarity score, 0.0-1.0 (default: 0.7)
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

/// Parameters for memory_list
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListMemoriesParams {
    /// Number of memories to return, 1-100 (default: 20)
    #[serde(default = "default_list_limit")]
    pub limit: u32,
    /// Number of memories to skip (default: 0)
    #[serde(default)]
    pub offset: u32,
}

/// Parameters for memory_get and memory_delete
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MemoryIdParams {
    /// Memory id (UUID)
    pub id: String,
}

/// Parameters for memory_update
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateMemoryParams {
    /// Memory id (UUID)
    pub id: String,
    /// New content, replaces the existing content
    pub content: Option<String>,
    /// New metadata, replaces the existing metadata
    pub metadata: Option<Metadata>,
}

/// Parameters for entity_create
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateEntityParams {
    /// Entity name (1-200 characters)
    pub name: String,
    /// Entity type: person, place, organization, project, concept, or other
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Optional string key/value metadata
    pub metadata: Option<Metadata>,
}

/// Parameters for entity_link
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LinkEntityParams {
    /// Entity id (UUID)
    pub entity_id: String,
    /// Memory id (UUID)
    pub memory_id: String,
    /// Relationship label (default: mentioned_in)
    pub relationship: Option<String>,
}

fn default_search_limit() -> u32 {
    10
}

fn default_list_limit() -> u32 {
    20
}

fn default_threshold() -> f64 {
    0.7
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MemoryError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn check_limit(limit: u32) -> Result<()> {
    if limit == 0 || limit > MAX_LIMIT {
        return Err(MemoryError::Validation(format!(
            "limit must be between 1 and {}, got {}",
            MAX_LIMIT, limit
        )));
    }
    Ok(())
}

impl StoreMemoryParams {
    pub fn validate(&self) -> Result<()> {
        require_text("content", &self.content)
    }

    /// Strip control characters, then validate the cleaned values
    pub fn sanitized(self) -> Result<Self> {
        let cleaned = Self {
            content: sanitize_text(&self.content),
            metadata: self.metadata.as_ref().map(sanitize_metadata),
        };
        cleaned.validate()?;
        Ok(cleaned)
    }
}

impl SearchMemoriesParams {
    pub fn validate(&self) -> Result<()> {
        require_text("query", &self.query)?;
        check_limit(self.limit)?;
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(MemoryError::Validation(format!(
                "threshold must be between 0.0 and 1.0, got {}",
                self.threshold
            )));
        }
        Ok(())
    }

    pub fn sanitized(self) -> Result<Self> {
        let cleaned = Self {
            query: sanitize_text(&self.query),
            ..self
        };
        cleaned.validate()?;
        Ok(cleaned)
    }
}

impl ListMemoriesParams {
    pub fn validate(&self) -> Result<()> {
        check_limit(self.limit)
    }
}

impl UpdateMemoryParams {
    pub fn validate(&self) -> Result<()> {
        if self.content.is_none() && self.metadata.is_none() {
            return Err(MemoryError::Validation(
                "memory_update requires content or metadata".to_string(),
            ));
        }
        if let Some(content) = &self.content {
            require_text("content", content)?;
        }
        Ok(())
    }

    pub fn sanitized(self) -> Result<Self> {
        let cleaned = Self {
            id: self.id.trim().to_string(),
            content: self.content.as_deref().map(sanitize_text),
            metadata: self.metadata.as_ref().map(sanitize_metadata),
        };
        cleaned.validate()?;
        Ok(cleaned)
    }

    /// Update body from already sanitized params
    pub fn to_update(&self) -> MemoryUpdate {
        MemoryUpdate {
            content: self.content.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

impl CreateEntityParams {
    /// The length bound applies to the name as transmitted, i.e. after escaping
    pub fn validate(&self) -> Result<()> {
        let len = self.name.trim().chars().count();
        if len == 0 || len > MAX_ENTITY_NAME_CHARS {
            return Err(MemoryError::Validation(format!(
                "name must be between 1 and {} characters after HTML escaping, got {}",
                MAX_ENTITY_NAME_CHARS, len
            )));
        }
        Ok(())
    }

    /// Strip control characters, trim, HTML-escape, then validate
    pub fn sanitized(self) -> Result<Self> {
        let cleaned = Self {
            name: escape_html(sanitize_text(&self.name).trim()),
            metadata: self.metadata.as_ref().map(sanitize_metadata),
            ..self
        };
        cleaned.validate()?;
        Ok(cleaned)
    }
}

impl LinkEntityParams {
    /// Trim ids; clean and escape the relationship, dropping it when blank
    pub fn sanitized(self) -> Self {
        let relationship = self
            .relationship
            .as_deref()
            .map(|r| escape_html(sanitize_text(r).trim()))
            .filter(|r| !r.is_empty());
        Self {
            entity_id: self.entity_id.trim().to_string(),
            memory_id: self.memory_id.trim().to_string(),
            relationship,
        }
    }
}

/// Remove ASCII control characters except newline, carriage return and tab
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_ascii_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

/// Apply [`sanitize_text`] to every key and value
pub fn sanitize_metadata(metadata: &Metadata) -> Metadata {
    metadata
        .iter()
        .map(|(k, v)| (sanitize_text(k), sanitize_text(v)))
        .collect()
}

/// Escape HTML-significant characters
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
