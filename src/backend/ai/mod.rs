//! AI Assistant Module
//!
//! Proxies code suggestion, review, explanation and fixing requests to the
//! Gemini API. The endpoints answer 503 when no API key is configured.
//!
//! # Module Structure
//!
//! ```text
//! ai/
//! ├── mod.rs      - Module exports and documentation
//! ├── client.rs   - Gemini REST client
//! ├── prompts.rs  - Task prompts and response fields
//! └── handlers.rs - HTTP handlers
//! ```

/// Gemini REST client
pub mod client;

/// Task prompts
pub mod prompts;

/// HTTP handlers
pub mod handlers;

pub use client::{AiError, GeminiClient};
pub use prompts::AiTask;
