/**
 * Room Aggregate
 *
 * This module defines the persisted room record shared by the REST surface
 * and the realtime layer: the buffer content, the language tag and the
 * participant roster.
 *
 * Participants are never removed from a room. Leaving or disconnecting flips
 * the participant to `Inactive`, which keeps "joined then left" distinct from
 * "never joined" for rejoin detection.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Content of a freshly created room
pub const DEFAULT_CODE: &str = "// Start coding here... ";

/// Participant cap applied when a room is created without one
pub const DEFAULT_MAX_PARTICIPANTS: u32 = 10;

/// Supported editor languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Javascript,
    Python,
    Java,
    Cpp,
    Html,
    Css,
    Typescript,
}

impl Language {
    /// Every supported language, in display order
    pub const ALL: [Language; 7] = [
        Language::Javascript,
        Language::Python,
        Language::Java,
        Language::Cpp,
        Language::Html,
        Language::Css,
        Language::Typescript,
    ];

    /// The wire/storage tag for this language
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::Html => "html",
            Language::Css => "css",
            Language::Typescript => "typescript",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.as_str() == tag)
            .ok_or_else(|| SharedError::validation("language", format!("Unsupported language: {}", s)))
    }
}

/// Lifecycle state of a participant within a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticipantStatus {
    /// Currently connected (or at least not yet left)
    Active,
    /// Known member that has left or disconnected
    Inactive,
}

impl ParticipantStatus {
    pub fn is_active(self) -> bool {
        matches!(self, ParticipantStatus::Active)
    }
}

impl From<bool> for ParticipantStatus {
    fn from(active: bool) -> Self {
        if active {
            ParticipantStatus::Active
        } else {
            ParticipantStatus::Inactive
        }
    }
}

/// Serializes `ParticipantStatus` as the `isActive` boolean clients expect
mod status_flag {
    use super::ParticipantStatus;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(status: &ParticipantStatus, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(status.is_active())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ParticipantStatus, D::Error> {
        bool::deserialize(deserializer).map(ParticipantStatus::from)
    }
}

/// A user's membership record within a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
    #[serde(rename = "isActive", with = "status_flag")]
    pub status: ParticipantStatus,
}

impl Participant {
    /// A newly admitted, active participant
    pub fn active(user_id: Uuid, joined_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            joined_at,
            status: ParticipantStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Persisted room record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Short, stable, human-shareable identifier (8 chars)
    pub room_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub creator: Uuid,
    /// Ordered by join time
    pub participants: Vec<Participant>,
    pub current_code: String,
    pub language: Language,
    /// Room-level soft delete flag
    pub is_active: bool,
    pub max_participants: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Generate a new short room identifier
    pub fn generate_id() -> String {
        Uuid::new_v4().simple().to_string()[..8].to_string()
    }

    pub fn participant(&self, user_id: Uuid) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }

    /// True iff the roster holds an active entry for `user_id`
    pub fn is_active_participant(&self, user_id: Uuid) -> bool {
        self.participant(user_id).is_some_and(Participant::is_active)
    }

    /// Whether one more participant entry can be appended
    pub fn has_capacity(&self) -> bool {
        self.participants.len() < self.max_participants as usize
    }

    /// Snapshot sent to a connection right after it joins
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            current_code: self.current_code.clone(),
            language: self.language,
            participants: self.participants.clone(),
        }
    }
}

/// Room state delivered to a joining connection (`room_data`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub current_code: String,
    pub language: Language,
    pub participants: Vec<Participant>,
}
