//! REST API Module
//!
//! HTTP handlers for room and code management. Authentication handlers live
//! in `auth::handlers` and the AI proxy in `ai::handlers`.
//!
//! # Module Structure
//!
//! ```text
//! api/
//! ├── mod.rs   - Module exports and documentation
//! ├── rooms.rs - Room CRUD, join/leave, chat history
//! └── code.rs  - Versioned code saves
//! ```
//!
//! Every handler here runs behind `auth_middleware` and reads the caller
//! through the `AuthUser` extractor.

/// Room handlers
pub mod rooms;

/// Code handlers
pub mod code;
