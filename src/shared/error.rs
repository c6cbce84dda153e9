//! Shared Error Types
//!
//! This module defines error types that are shared between the server and any
//! client that speaks the realtime protocol. These errors represent common
//! failure cases when building or decoding wire types.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization/deserialization failures
//! - `ValidationError` - Data validation failures (empty message, unknown language)
//! - `MessageError` - Chat message errors
//!
//! # Usage
//!
//! ```rust
//! use codecollab::shared::error::SharedError;
//!
//! let error = SharedError::validation("language", "Unsupported language: brainfuck");
//! ```
use thiserror::Error;

/// Shared error types that can occur on both ends of a connection
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Message-related error
    #[error("Message error: {message}")]
    MessageError {
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new message error
    pub fn message(message: impl Into<String>) -> Self {
        Self::MessageError {
            message: message.into(),
        }
    }

    /// The bare, user-facing text of this error without the category prefix
    pub fn detail(&self) -> &str {
        match self {
            Self::SerializationError { message }
            | Self::ValidationError { message, .. }
            | Self::MessageError { message } => message,
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
