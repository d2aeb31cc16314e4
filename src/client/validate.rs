//! Local input checks applied before any network call

use uuid::Uuid;

use crate::error::{MemoryError, Result};

/// Maximum payload size for content, queries and entity names (50 KiB).
///
/// Counted in Unicode scalar values, not bytes.
pub const MAX_CONTENT_CHARS: usize = 50 * 1024;

/// Length of the canonical hyphenated UUID form
const HYPHENATED_UUID_LEN: usize = 36;

/// Accept only the five-group hyphenated UUID form (any letter case).
pub fn validate_uuid(field: &str, value: &str) -> Result<()> {
    let well_formed = value.len() == HYPHENATED_UUID_LEN
        && value.split('-').map(str::len).eq([8, 4, 4, 4, 12])
        && Uuid::try_parse(value).is_ok();
    if well_formed {
        Ok(())
    } else {
        Err(MemoryError::Validation(format!(
            "{} must be a valid UUID, got '{}'",
            field,
            preview(value)
        )))
    }
}

/// Reject text longer than [`MAX_CONTENT_CHARS`]
pub fn ensure_within_limit(field: &str, text: &str) -> Result<()> {
    let size = text.chars().count();
    if size > MAX_CONTENT_CHARS {
        return Err(MemoryError::Validation(format!(
            "{} exceeds maximum size of {} characters (got {})",
            field, MAX_CONTENT_CHARS, size
        )));
    }
    Ok(())
}

fn preview(value: &str) -> String {
    const MAX_PREVIEW: usize = 40;
    if value.chars().count() <= MAX_PREVIEW {
        value.to_string()
    } else {
        let head: String = value.chars().take(MAX_PREVIEW).collect();
        format!("{}...", head)
    }
}
