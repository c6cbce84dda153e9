/**
 * Application State Management
 *
 * This module defines the application state structure and implements the
 * `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` holds:
 * - The loaded configuration
 * - The persistence store (PostgreSQL or in-memory)
 * - The realtime event router and its session directory
 * - Per-room broadcast channels
 * - The token authenticator
 * - The optional Gemini client
 *
 * Every field is cheap to clone (an `Arc` or a handle around one), so the
 * state is cloned freely into handlers and connection tasks.
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::ai::GeminiClient;
use crate::backend::auth::{Authenticator, TokenService};
use crate::backend::realtime::RoomChannels;
use crate::backend::room::{EventRouter, SessionDirectory};
use crate::backend::server::config::ServerConfig;
use crate::backend::store::{MemoryStore, SharedStore};

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: SharedStore,
    /// Realtime event router
    pub events: EventRouter,
    pub channels: RoomChannels,
    pub authenticator: Authenticator,
    /// `None` when no Gemini API key is configured
    pub ai: Option<GeminiClient>,
}

impl AppState {
    /// Wire every service around the given store
    pub fn new(config: ServerConfig, store: SharedStore) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_days);
        let ai = config
            .gemini_api_key
            .as_ref()
            .map(|key| GeminiClient::new(key.clone(), config.gemini_model.clone()));
        Self {
            events: EventRouter::new(store.clone(), SessionDirectory::new()),
            channels: RoomChannels::new(config.broadcast_capacity),
            authenticator: Authenticator::new(tokens, store.clone()),
            ai,
            store,
            config: Arc::new(config),
        }
    }

    /// State backed by a fresh `MemoryStore`
    pub fn in_memory(config: ServerConfig) -> Self {
        Self::new(config, Arc::new(MemoryStore::new()))
    }

    pub fn sessions(&self) -> &SessionDirectory {
        self.events.sessions()
    }
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for RoomChannels {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.channels.clone()
    }
}

impl FromRef<AppState> for EventRouter {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.events.clone()
    }
}

impl FromRef<AppState> for Authenticator {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.authenticator.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
