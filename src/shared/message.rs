/**
 * Chat Message and Code Snapshot Records
 *
 * Append-only records owned by the store: chat messages (one log per room,
 * ordered by creation time) and versioned code snapshots written by manual
 * saves. Both embed the author's public profile so clients can render them
 * without a second lookup.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::room::Language;
use crate::shared::user::UserSummary;

/// Longest accepted chat message, in characters
pub const MAX_MESSAGE_LEN: usize = 10_000;

/// Kind tag of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
}

/// A persisted chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "room")]
    pub room_id: String,
    pub sender: UserSummary,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
}

/// Validate and normalize chat text before it is persisted
///
/// Trims surrounding whitespace; rejects empty or oversized messages.
pub fn normalize_message_text(text: &str) -> Result<String, SharedError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SharedError::message("Message cannot be empty"));
    }
    if trimmed.chars().count() > MAX_MESSAGE_LEN {
        return Err(SharedError::message(format!(
            "Message exceeds {} characters",
            MAX_MESSAGE_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// A versioned manual save of a room's buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSnapshot {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "room")]
    pub room_id: String,
    pub content: String,
    pub language: Language,
    pub updated_by: UserSummary,
    /// 1-based, strictly increasing per room
    pub version: i64,
    pub change_description: String,
    pub created_at: DateTime<Utc>,
}
