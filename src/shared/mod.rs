//! Shared Module
//!
//! This module contains the types that cross the wire: the persisted room and
//! message records returned by the REST API and the events exchanged over a
//! realtime room connection.
//!
//! # Overview
//!
//! The shared module has no server dependencies. Everything here is plain
//! serde data so it can be reused by any Rust client speaking the protocol.
//! Field names follow the camelCase JSON conventions of the browser client.

/// Room aggregate and participant roster
pub mod room;

/// Public user profile
pub mod user;

/// Chat messages and code snapshots
pub mod message;

/// Realtime event protocol
pub mod event;

/// Shared error types
pub mod error;

/// Re-export commonly used types for convenience
pub use error::SharedError;
pub use event::{ClientEvent, ServerEvent};
pub use message::{ChatMessage, CodeSnapshot};
pub use room::{Language, Participant, ParticipantStatus, Room, RoomSnapshot};
pub use user::UserSummary;
