/**
 * Room Broadcast Channels
 *
 * One `tokio::sync::broadcast` channel per room. Every event carries the id of
 * the connection that caused it so receivers can drop their own echoes, which
 * is how "everyone but the sender" fan-out is expressed on a channel that
 * delivers to every subscriber.
 *
 * Channels are created lazily on first subscribe. Publishing to a room nobody
 * has subscribed to is a no-op. Channels left without receivers are pruned by
 * `cleanup_inactive_channels`, which `server::init` runs periodically.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::shared::event::ServerEvent;

/// Default per-room channel capacity
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// An event published to a room
#[derive(Debug, Clone)]
pub struct RoomBroadcast {
    /// Connection that caused the event; `None` for server-originated events
    pub origin: Option<Uuid>,
    pub event: ServerEvent,
}

/// Per-room broadcast channels
#[derive(Clone, Debug)]
pub struct RoomChannels {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<RoomBroadcast>>>>,
    capacity: usize,
}

impl Default for RoomChannels {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl RoomChannels {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<RoomBroadcast>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to a room, creating its channel if needed
    pub fn subscribe(&self, room_id: &str) -> broadcast::Receiver<RoomBroadcast> {
        let mut channels = self.lock();
        channels
            .entry(room_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Publish an event to a room
    ///
    /// Returns the number of receivers it was handed to (0 if the room has no
    /// channel or no subscribers).
    pub fn publish(&self, room_id: &str, origin: Option<Uuid>, event: ServerEvent) -> usize {
        let name = event.name();
        let channels = self.lock();
        let Some(sender) = channels.get(room_id) else {
            tracing::debug!("[Realtime] No channel for room {}, dropped {}", room_id, name);
            return 0;
        };
        match sender.send(RoomBroadcast { origin, event }) {
            Ok(count) => {
                tracing::debug!("[Realtime] {} broadcast to {} subscribers of {}", name, count, room_id);
                count
            }
            Err(_) => 0,
        }
    }

    /// Drop channels that have no receivers left
    pub fn cleanup_inactive_channels(&self) -> usize {
        let mut channels = self.lock();
        let before = channels.len();
        channels.retain(|_, sender| sender.receiver_count() > 0);
        before - channels.len()
    }

    /// Receivers currently subscribed to a room
    pub fn subscriber_count(&self, room_id: &str) -> usize {
        self.lock().get(room_id).map_or(0, |sender| sender.receiver_count())
    }

    pub fn channel_count(&self) -> usize {
        self.lock().len()
    }
}
