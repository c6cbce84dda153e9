/**
 * Realtime Event Errors
 *
 * Per-event failure classification. Every variant is recovered inside the
 * handler that raised it and turned into a sender-only error event; none of
 * them closes the connection.
 */

use thiserror::Error;

use crate::backend::store::StoreError;
use crate::shared::error::SharedError;
use crate::shared::event::ServerEvent;

#[derive(Debug, Error)]
pub enum RealtimeError {
    /// Room does not exist or was soft-deleted
    #[error("Room not found")]
    RoomNotFound,

    /// Sender is not an active participant of the room
    #[error("You are not an active participant of this room")]
    NotAMember,

    /// A new participant would exceed the room's capacity
    #[error("Room is full")]
    RoomFull,

    /// Payload failed validation (unknown language, empty message, ...)
    #[error("{}", .0.detail())]
    Invalid(#[from] SharedError),

    /// Store failure; `context` is what the sender is told
    #[error("{context}")]
    Persistence {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl RealtimeError {
    pub fn persistence(context: &'static str, source: StoreError) -> Self {
        Self::Persistence { context, source }
    }

    /// The sender-only event reporting this failure
    pub fn to_event(&self) -> ServerEvent {
        let message = self.to_string();
        match self {
            Self::RoomNotFound => ServerEvent::room_not_found(message),
            Self::NotAMember => ServerEvent::not_a_member(message),
            Self::RoomFull | Self::Invalid(_) | Self::Persistence { .. } => ServerEvent::error(message),
        }
    }
}
