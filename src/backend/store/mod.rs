//! Persistence Module
//!
//! This module defines the storage interface consumed by the realtime layer and
//! the REST handlers, plus its two implementations.
//!
//! # Architecture
//!
//! - **`Store`** - Object-safe umbrella trait (`Arc<dyn Store>`) made of
//!   `UserStore`, `RoomStore`, `MessageStore` and `CodeStore`
//! - **`memory`** - Process-local store, used when no database is configured
//! - **`postgres`** - PostgreSQL store backed by `sqlx`
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── mod.rs      - Traits and error type
//! ├── memory.rs   - In-memory implementation
//! └── postgres.rs - PostgreSQL implementation
//! ```
//!
//! # Consistency
//!
//! Every write is a single-field overwrite or an append, so concurrent writers
//! converge on last-writer-wins. The one exception is admitting a participant
//! that is not yet on the roster: both implementations make that step atomic
//! per (room, user), so racing admits never produce duplicate entries.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::backend::auth::users::{NewUser, User};
use crate::backend::room::membership::AdmitOutcome;
use crate::shared::message::{ChatMessage, CodeSnapshot};
use crate::shared::room::{Language, Room};
use crate::shared::user::UserSummary;

/// In-memory store
pub mod memory;

/// PostgreSQL store
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors raised by a store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced record does not exist (or is soft-deleted)
    #[error("{entity} not found")]
    NotFound {
        /// Kind of record that was looked up
        entity: &'static str,
    },

    /// A uniqueness constraint was violated
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable error message
        message: String,
    },

    /// A persisted value could not be decoded
    #[error("Corrupt record: {message}")]
    Corrupt {
        /// Human-readable error message
        message: String,
    },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failure at startup
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}

/// User accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; `Conflict` when the email is taken
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

/// Room aggregates and their participant rosters
///
/// Lookups only ever return rooms whose room-level `is_active` flag is set.
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn create_room(&self, room: Room) -> Result<Room, StoreError>;

    async fn find_room(&self, room_id: &str) -> Result<Option<Room>, StoreError>;

    /// Active rooms the user has a roster entry in, most recently updated first
    async fn rooms_for_user(&self, user_id: Uuid) -> Result<Vec<Room>, StoreError>;

    /// Add or reactivate a participant
    ///
    /// Appending a new entry is conditioned on the user's absence from the
    /// roster at write time and on the room's capacity.
    async fn admit_participant(&self, room_id: &str, user_id: Uuid) -> Result<AdmitOutcome, StoreError>;

    /// Flip an existing participant to inactive; no-op if absent
    async fn deactivate_participant(&self, room_id: &str, user_id: Uuid) -> Result<(), StoreError>;

    /// Overwrite the room's buffer content
    async fn update_code(&self, room_id: &str, code: &str) -> Result<(), StoreError>;

    /// Overwrite the room's language tag
    async fn update_language(&self, room_id: &str, language: Language) -> Result<(), StoreError>;

    /// Room-level soft delete
    async fn deactivate_room(&self, room_id: &str) -> Result<(), StoreError>;
}

/// Per-room chat log
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a text message authored by `sender`
    async fn append_message(
        &self,
        room_id: &str,
        sender: &UserSummary,
        content: &str,
    ) -> Result<ChatMessage, StoreError>;

    /// The newest `limit` messages of a room, in creation order
    async fn recent_messages(&self, room_id: &str, limit: usize) -> Result<Vec<ChatMessage>, StoreError>;
}

/// One page of code snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPage {
    /// Newest first
    pub snapshots: Vec<CodeSnapshot>,
    /// Total number of snapshots for the room
    pub total: u64,
}

/// Versioned manual saves
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Record a snapshot with version = previous max + 1
    async fn save_snapshot(
        &self,
        room_id: &str,
        content: &str,
        language: Language,
        author: &UserSummary,
        change_description: &str,
    ) -> Result<CodeSnapshot, StoreError>;

    /// `page` is 1-based
    async fn snapshot_history(&self, room_id: &str, page: u32, limit: u32) -> Result<SnapshotPage, StoreError>;

    async fn snapshot_version(&self, room_id: &str, version: i64) -> Result<Option<CodeSnapshot>, StoreError>;
}

/// Everything the server needs from persistence
pub trait Store: UserStore + RoomStore + MessageStore + CodeStore {}

impl<T> Store for T where T: UserStore + RoomStore + MessageStore + CodeStore {}

/// Shared handle to the configured store
pub type SharedStore = Arc<dyn Store>;
