//! Real-time Transport Module
//!
//! WebSocket delivery for the room session layer. Handlers in `room` decide
//! what happens; this module moves frames and fans events out to rooms.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs        - Module exports and documentation
//! ├── broadcast.rs  - Per-room broadcast channels
//! ├── connection.rs - Per-connection driver applying handler outcomes
//! └── socket.rs     - GET /ws upgrade handler and connection loop
//! ```
//!
//! # Wire Format
//!
//! Every frame, in both directions, is a JSON text message:
//!
//! ```json
//! { "event": "code_change", "data": { "roomId": "a1b2c3d4", "code": "..." } }
//! ```
//!
//! Frames that do not decode produce an `error` event for the sender and the
//! connection stays open.

/// Per-room broadcast channels
pub mod broadcast;

/// Connection driver
pub mod connection;

/// WebSocket endpoint
pub mod socket;

pub use broadcast::{RoomBroadcast, RoomChannels};
pub use connection::ConnectionDriver;
pub use socket::ws_handler;
