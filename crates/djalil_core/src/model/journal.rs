//! Journal entry model.

use crate::model::owner::OwnerId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub type JournalEntryId = Uuid;

const PREVIEW_MAX_CHARS: usize = 100;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JournalValidationError {
    #[error("journal content must not be blank")]
    BlankContent,
}

/// Timestamped free-text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: JournalEntryId,
    pub owner_id: OwnerId,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl JournalEntry {
    /// Single-line preview for list rendering.
    pub fn preview(&self) -> String {
        derive_preview(self.content.as_str())
    }
}

pub fn validate_content(content: &str) -> Result<(), JournalValidationError> {
    if content.trim().is_empty() {
        return Err(JournalValidationError::BlankContent);
    }
    Ok(())
}

/// Collapses whitespace runs and keeps the first 100 chars.
pub fn derive_preview(content: &str) -> String {
    let normalized = WHITESPACE_RE.replace_all(content, " ");
    let trimmed = normalized.trim();
    let mut preview: String = trimmed.chars().take(PREVIEW_MAX_CHARS).collect();
    if trimmed.chars().count() > PREVIEW_MAX_CHARS {
        preview.push_str("...");
    }
    preview
}
