/**
 * Server Initialization
 *
 * Builds the application state and router.
 *
 * # Initialization Process
 *
 * 1. Pick the store: PostgreSQL when `database_url` is set and reachable
 *    (migrations run on connect), otherwise the in-memory store
 * 2. Wire the realtime router, broadcast channels, authenticator and the
 *    optional AI client into `AppState`
 * 3. Create the router
 * 4. Start the periodic broadcast channel cleanup
 *
 * A database that cannot be reached is logged and the server keeps running
 * on the in-memory store.
 */

use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::backend::realtime::RoomChannels;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::ServerConfig;
use crate::backend::server::state::AppState;
use crate::backend::store::{MemoryStore, PgStore, SharedStore};

/// How often channels without subscribers are pruned
pub const CHANNEL_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Build the application state for a loaded configuration
pub async fn build_state(config: ServerConfig) -> AppState {
    let store: SharedStore = match config.database_url.as_deref() {
        Some(url) => match PgStore::connect(url).await {
            Ok(store) => {
                tracing::info!("[Server] Connected to PostgreSQL, migrations applied");
                Arc::new(store)
            }
            Err(e) => {
                tracing::error!("[Server] Database unavailable, falling back to in-memory store: {}", e);
                Arc::new(MemoryStore::new())
            }
        },
        None => {
            tracing::info!("[Server] DATABASE_URL not set, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    if config.gemini_api_key.is_none() {
        tracing::info!("[Server] GEMINI_API_KEY not set, AI endpoints disabled");
    }

    AppState::new(config, store)
}

/// Create the router and start background tasks
pub fn create_app(app_state: AppState) -> Router<()> {
    spawn_channel_cleanup(app_state.channels.clone(), CHANNEL_CLEANUP_INTERVAL);
    let app = create_router(app_state);
    tracing::info!("[Server] Router configured with periodic cleanup task");
    app
}

/// Periodically drop broadcast channels nobody listens to
pub fn spawn_channel_cleanup(channels: RoomChannels, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = channels.cleanup_inactive_channels();
            tracing::debug!(
                "[Realtime] Cleaned up {} inactive room channels, {} remain",
                removed,
                channels.channel_count()
            );
        }
    })
}
