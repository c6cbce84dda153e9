//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs         - Module exports and documentation
//! ├── router.rs      - Main router creation and layers
//! └── api_routes.rs  - REST endpoints
//! ```
//!
//! # Route Types
//!
//! ## Realtime
//!
//! - `GET /ws` - WebSocket upgrade; token in header, `token` query or cookie
//!
//! ## API
//!
//! - `POST /api/auth/register`, `POST /api/auth/login`, `GET /api/auth/profile`
//! - `POST|GET /api/rooms`, `GET|DELETE /api/rooms/{roomId}`,
//!   `POST /api/rooms/{roomId}/join`, `POST /api/rooms/{roomId}/leave`,
//!   `GET /api/rooms/{roomId}/messages`
//! - `POST /api/code/{roomId}`, `GET /api/code/{roomId}/history`,
//!   `GET /api/code/{roomId}/current`, `GET /api/code/{roomId}/version/{version}`
//! - `POST /api/ai/suggest|review|explain|fix`
//!
//! ## Health
//!
//! - `GET /health` - `{ "status": "ok" }`

/// Main router creation
pub mod router;

/// API endpoint routes
pub mod api_routes;

pub use router::create_router;
