/**
 * Session Directory
 *
 * Process-wide index from a live connection id to the (user, room) pair it is
 * currently operating in. Created once at server start and injected into the
 * event router; entries are added on `join_room` and removed on leave or
 * disconnect. Nothing here is persisted: a restart severs every connection, so
 * the directory is rebuilt from scratch as clients reconnect.
 *
 * A user may hold several entries at once (one per tab or device), each under
 * its own connection id.
 */

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Binding between one live connection and the room it has joined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSession {
    pub user_id: Uuid,
    pub user_name: String,
    pub room_id: String,
}

/// Shared, cloneable session index
#[derive(Debug, Clone, Default)]
pub struct SessionDirectory {
    sessions: Arc<RwLock<HashMap<Uuid, ConnectionSession>>>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `connection_id`
    pub async fn put(&self, connection_id: Uuid, user_id: Uuid, user_name: impl Into<String>, room_id: impl Into<String>) {
        let session = ConnectionSession {
            user_id,
            user_name: user_name.into(),
            room_id: room_id.into(),
        };
        self.sessions.write().await.insert(connection_id, session);
    }

    pub async fn get(&self, connection_id: Uuid) -> Option<ConnectionSession> {
        self.sessions.read().await.get(&connection_id).cloned()
    }

    /// Delete the entry, returning it if present
    pub async fn remove(&self, connection_id: Uuid) -> Option<ConnectionSession> {
        self.sessions.write().await.remove(&connection_id)
    }

    /// Number of live connections `user_id` holds in `room_id`
    pub async fn live_sessions(&self, user_id: Uuid, room_id: &str) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id && s.room_id == room_id)
            .count()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
