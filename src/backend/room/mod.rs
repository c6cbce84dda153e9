//! Room Session Coordination
//!
//! This module maps live connections to authenticated users and rooms, guards
//! every state-changing event with a membership check, and keeps the persisted
//! participant roster in step with connects, leaves and abrupt disconnects.
//!
//! # Architecture
//!
//! - **`session`** - `SessionDirectory`, the in-memory connection index
//! - **`membership`** - `MembershipAuthority` and the roster rules
//! - **`router`** - `EventRouter`, the per-connection event state machine
//! - **`handlers`** - One handler per client event
//! - **`outcome`** - Transport-agnostic description of what a handler wants sent
//! - **`error`** - `RealtimeError`, mapped to sender-only error events
//!
//! # Module Structure
//!
//! ```text
//! room/
//! ├── mod.rs        - Module exports and documentation
//! ├── session.rs    - Session directory
//! ├── membership.rs - Membership authority
//! ├── router.rs     - Event router and connection context
//! ├── outcome.rs    - Handler outcomes
//! ├── error.rs      - Realtime error type
//! └── handlers/     - Per-event handlers
//! ```
//!
//! # Consistency Model
//!
//! Buffer content and language follow last-writer-wins: whichever overwrite
//! commits last is what a new joiner receives. Events from one connection are
//! handled strictly in order; events from different connections interleave
//! freely. Participants are never removed from a roster, only marked inactive.

/// Connection session index
pub mod session;

/// Room membership checks and roster rules
pub mod membership;

/// Event router
pub mod router;

/// Per-event handlers
pub mod handlers;

/// Handler outcomes
pub mod outcome;

/// Realtime error type
pub mod error;

pub use error::RealtimeError;
pub use membership::{AdmitOutcome, MembershipAuthority};
pub use outcome::{Dispatch, GroupChange, Outcome, Recipients};
pub use router::{ConnectionContext, EventRouter};
pub use session::{ConnectionSession, SessionDirectory};
