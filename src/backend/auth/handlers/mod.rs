//! Authentication Handlers Module
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── types.rs    - Request and response types
//! ├── register.rs - User registration handler
//! ├── login.rs    - User authentication handler
//! └── profile.rs  - Current user handler
//! ```
//!
//! # Handlers
//!
//! - **`register`** - POST /api/auth/register
//! - **`login`** - POST /api/auth/login
//! - **`profile`** - GET /api/auth/profile (authenticated)
//!
//! Register and login both answer with the user profile plus a token, and set
//! the same token as an `HttpOnly` cookie.

/// Request and response types
pub mod types;

/// Register handler
pub mod register;

/// Login handler
pub mod login;

/// Current user handler
pub mod profile;

pub use types::{AuthResponse, LoginRequest, RegisterRequest};

pub use login::login;
pub use profile::profile;
pub use register::register;
