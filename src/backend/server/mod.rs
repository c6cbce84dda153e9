//! Server Module
//!
//! Configuration, application state and startup wiring for the Axum server.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs    - Module exports and documentation
//! ├── config.rs - ServerConfig loading (defaults, TOML file, environment)
//! ├── state.rs  - AppState and FromRef implementations
//! └── init.rs   - Store selection, router creation, background tasks
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `ServerConfig::load`
//! 2. **State Creation**: `init::build_state` picks the store and wires services
//! 3. **Router Creation**: `init::create_app` builds routes and starts cleanup

/// Application state
pub mod state;

/// Configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::{ConfigError, ServerConfig};
pub use init::{build_state, create_app};
pub use state::AppState;
