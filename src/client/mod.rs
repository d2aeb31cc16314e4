//! Memory service API client
//!
//! - `executor`: single authenticated request with timeout and error classification
//! - `retry`: exponential backoff with jitter around the executor
//! - `memory_client`: typed memory/entity operations
//! - `validate`: local UUID and size checks
//! - `types`: data model

pub mod executor;
pub mod memory_client;
pub mod retry;
pub mod types;
pub mod validate;

pub use executor::HttpExecutor;
pub use memory_client::MemoryClient;
pub use retry::{with_retry, Attempt, RetryPolicy};
pub use types::{
    Entity, EntityType, HealthStatus, ListResponse, Memory, MemoryUpdate, Metadata, SearchResult,
};
pub use validate::{ensure_within_limit, validate_uuid, MAX_CONTENT_CHARS};
