//! Codecollab
//!
//! Backend for a real-time collaborative code editor. Users join rooms over a
//! WebSocket, edit a shared buffer, chat, see each other's cursors and set up
//! peer-to-peer calls; a REST API manages accounts, rooms and versioned code
//! saves.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types usable by any client
//!   - Rooms, participants, chat messages, code snapshots
//!   - Client and server realtime events
//!   - Error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Room session coordination and WebSocket transport
//!   - Persistence (PostgreSQL or in-memory)
//!   - Authentication, REST handlers, AI assistant
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the `backend` module and the
//!   `codecollab-server` binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use codecollab::backend::{build_state, create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::load()?;
//! let app = create_app(build_state(config).await);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
