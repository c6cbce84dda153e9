//! Backend Module
//!
//! All server-side code for the collaborative editor: the realtime room
//! session layer, its WebSocket transport, persistence, authentication and the
//! REST surface around them.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`room`** - Session directory, membership authority, event router and
//!   per-event handlers
//! - **`realtime`** - WebSocket endpoint and per-room broadcast channels
//! - **`store`** - Persistence traits with in-memory and PostgreSQL backends
//! - **`auth`** - Accounts, JWT tokens, credential resolution
//! - **`api`** - Room and code REST handlers
//! - **`ai`** - Gemini-backed code assistant
//! - **`routes`** - Router assembly
//! - **`middleware`** - Authentication middleware
//! - **`server`** - Configuration, state and startup
//! - **`error`** - HTTP error type
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── room/           - Room session coordination
//! ├── realtime/       - WebSocket transport
//! ├── store/          - Persistence
//! ├── auth/           - Authentication
//! ├── api/            - REST handlers
//! ├── ai/             - AI assistant
//! ├── routes/         - Route configuration
//! ├── middleware/     - Request middleware
//! ├── server/         - Startup and state
//! └── error/          - Error types
//! ```
//!
//! # Event Flow
//!
//! ```text
//! socket frame ─▶ ConnectionDriver ─▶ EventRouter ─▶ handler ─▶ Outcome
//!                       │                                          │
//!                       ◀──── direct events / room broadcast ◀─────┘
//! ```

/// Server setup and configuration
#[cfg(feature = "ssr")]
pub mod server;

/// Route configuration
#[cfg(feature = "ssr")]
pub mod routes;

/// Room session coordination
#[cfg(feature = "ssr")]
pub mod room;

/// WebSocket transport
#[cfg(feature = "ssr")]
pub mod realtime;

/// Persistence
#[cfg(feature = "ssr")]
pub mod store;

/// Backend error types
#[cfg(feature = "ssr")]
pub mod error;

/// Authentication and user management
#[cfg(feature = "ssr")]
pub mod auth;

/// Middleware for request processing
#[cfg(feature = "ssr")]
pub mod middleware;

/// Room and code REST handlers
#[cfg(feature = "ssr")]
pub mod api;

/// AI code assistant
#[cfg(feature = "ssr")]
pub mod ai;

#[cfg(feature = "ssr")]
pub use error::BackendError;
#[cfg(feature = "ssr")]
pub use server::{build_state, create_app, AppState, ServerConfig};
