/**
 * Backend Error Types
 *
 * This module defines the error type returned by HTTP handlers. Every variant
 * maps to a status code and converts into a JSON response (see `conversion`).
 *
 * # Error Categories
 *
 * ## Handler Errors
 *
 * Request-level failures with an explicit status: bad input, missing room,
 * forbidden action, upstream AI failure.
 *
 * ## Store Errors
 *
 * Persistence failures. `NotFound` and `Conflict` surface as 404 / 409; any
 * other store failure is logged and reported as a generic 500 so database
 * details never reach clients.
 *
 * ## Auth Errors
 *
 * Missing or invalid credentials; always 401.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::auth::credentials::AuthError;
use crate::backend::store::StoreError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// ```rust
/// use codecollab::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::NOT_FOUND, "Room not found");
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status code
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Application state error (misconfiguration, unavailable service)
    #[error("State error: {message}")]
    StateError {
        /// Human-readable error message
        message: String,
    },

    /// Authentication failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Persistence failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Shared error (validation, serialization)
    #[error(transparent)]
    SharedError(#[from] SharedError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::NOT_FOUND, message)
    }

    /// Create a new state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::StateError {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `StateError` - 500 Internal Server Error
    /// - `Auth` - 401 Unauthorized, or 500 if the user lookup failed
    /// - `Store` - 404 / 409 / 500 depending on the store error
    /// - `SharedError` - 400 for validation, 500 for serialization
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::StateError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(AuthError::Lookup(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Store(err) => match err {
                StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                StoreError::Conflict { .. } => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } | SharedError::MessageError { .. } => StatusCode::BAD_REQUEST,
            },
        }
    }

    /// Client-facing error message
    ///
    /// Server-side failures collapse to a generic message.
    pub fn message(&self) -> String {
        if self.status_code().is_server_error() {
            if let Self::HandlerError { message, .. } = self {
                return message.clone();
            }
            return "Internal server error".to_string();
        }
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::StateError { message } => message.clone(),
            Self::Auth(err) => err.to_string(),
            Self::Store(StoreError::NotFound { entity }) => format!("{} not found", capitalize(entity)),
            Self::Store(err) => err.to_string(),
            Self::SharedError(err) => err.detail().to_string(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
