//! Middleware Module
//!
//! HTTP middleware applied in front of handlers.
//!
//! - **`auth`** - Token verification for protected routes, plus the `AuthUser`
//!   extractor handlers use to read the result

pub mod auth;

pub use auth::{auth_middleware, AuthUser, AuthenticatedUser};
