//! Authentication Module
//!
//! This module handles user accounts, JWT issuance and verification, and the
//! HTTP endpoints for registering and logging in.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - User model and credential helpers
//! ├── tokens.rs       - JWT creation and verification
//! ├── credentials.rs  - Token extraction and user resolution
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Register**: name, email and password → user created → token returned
//! 2. **Login**: email and password verified → token returned
//! 3. **Any other request**: token (header, query or cookie) → user loaded
//!
//! The WebSocket handshake goes through the same `Authenticator` as the HTTP
//! middleware.
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - Tokens expire after `token_ttl_days` (30 by default)
//! - Invalid credentials return 401 without saying which part was wrong

/// User model and credential helpers
pub mod users;

/// JWT creation and verification
pub mod tokens;

/// Token extraction and user resolution
pub mod credentials;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use credentials::{AuthError, Authenticator};
pub use handlers::{login, profile, register};
pub use tokens::{Claims, TokenService};
pub use users::User;
