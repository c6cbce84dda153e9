//! Room Event Handlers
//!
//! One async function per client event. Each takes the router (store, session
//! directory, membership authority) and the connection context, and returns an
//! `Outcome` for the transport to apply. Handlers never see the socket.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs       - Module exports and documentation
//! ├── join.rs      - join_room
//! ├── code.rs      - code_change, language_change
//! ├── chat.rs      - send_message
//! ├── presence.rs  - cursor_position, typing_start / typing_stop
//! ├── signaling.rs - WebRTC relay, start_call / end_call
//! └── leave.rs     - leave_room, transport disconnect
//! ```
//!
//! # Failure Handling
//!
//! Handlers that can fail return `Result<Outcome, RealtimeError>`; the router
//! turns the error into a sender-only error event. Signaling, typing, leave and
//! disconnect return a plain `Outcome` because they never report failure.

pub mod chat;
pub mod code;
pub mod join;
pub mod leave;
pub mod presence;
pub mod signaling;
