//! Backend Error Module
//!
//! This module defines the error type returned by HTTP handlers and its
//! conversion into HTTP responses.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse implementation
//! ```
//!
//! # Error Types
//!
//! - `HandlerError` - Request failures with an explicit status code
//! - `StateError` - Application state / configuration failures
//! - `Auth` - Credential failures (401)
//! - `Store` - Persistence failures
//! - `SharedError` - Validation and serialization errors from the shared module
//!
//! Realtime events use their own error type (`room::RealtimeError`) because
//! they are reported as events on the socket, never as HTTP responses.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
