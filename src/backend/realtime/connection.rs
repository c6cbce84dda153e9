/**
 * Connection Driver
 *
 * Owns the per-connection state (identity, joined room, broadcast
 * subscription) and applies handler `Outcome`s to the room channels:
 *
 * - `Sender` events are returned to the caller for direct delivery
 * - `Others` events are published to the room with this connection as origin
 * - `Room` events are published and also returned, so the sender receives its
 *   copy even before its own subscription exists
 *
 * The driver has no socket of its own; `socket::run_connection` feeds it frames
 * and writes what it returns. Tests drive it directly.
 */

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use crate::backend::realtime::broadcast::{RoomBroadcast, RoomChannels};
use crate::backend::room::outcome::{GroupChange, Outcome, Recipients};
use crate::backend::room::router::{ConnectionContext, EventRouter};
use crate::shared::event::{ClientEvent, ServerEvent};
use crate::shared::user::UserSummary;

struct GroupSubscription {
    room_id: String,
    receiver: broadcast::Receiver<RoomBroadcast>,
}

/// Per-connection event pump
pub struct ConnectionDriver {
    ctx: ConnectionContext,
    router: EventRouter,
    channels: RoomChannels,
    group: Option<GroupSubscription>,
}

impl ConnectionDriver {
    /// Driver for a freshly authenticated connection
    pub fn new(user: UserSummary, router: EventRouter, channels: RoomChannels) -> Self {
        Self {
            ctx: ConnectionContext::new(user),
            router,
            channels,
            group: None,
        }
    }

    pub fn context(&self) -> &ConnectionContext {
        &self.ctx
    }

    /// Room whose broadcast group this connection is in
    pub fn subscribed_room(&self) -> Option<&str> {
        self.group.as_ref().map(|g| g.room_id.as_str())
    }

    /// Handle one text frame; returns the events to send back on this socket
    pub async fn on_text(&mut self, text: &str) -> Vec<ServerEvent> {
        match ClientEvent::from_json(text) {
            Ok(event) => self.on_event(event).await,
            Err(e) => {
                tracing::warn!("[Realtime] Malformed frame from {}: {}", self.ctx.user.name, e);
                vec![ServerEvent::error(format!("Invalid event: {}", e.detail()))]
            }
        }
    }

    /// Handle one decoded event
    pub async fn on_event(&mut self, event: ClientEvent) -> Vec<ServerEvent> {
        let outcome = self.router.handle(&mut self.ctx, event).await;
        self.apply(outcome)
    }

    fn apply(&mut self, outcome: Outcome) -> Vec<ServerEvent> {
        for change in outcome.group_changes {
            match change {
                GroupChange::Join(room_id) => {
                    let receiver = self.channels.subscribe(&room_id);
                    self.group = Some(GroupSubscription { room_id, receiver });
                }
                GroupChange::Leave(room_id) => {
                    if self.subscribed_room() == Some(room_id.as_str()) {
                        self.group = None;
                    }
                }
            }
        }

        let origin = Some(self.ctx.connection_id);
        let mut direct = Vec::new();
        for dispatch in outcome.dispatches {
            match dispatch.recipients {
                Recipients::Sender => direct.push(dispatch.event),
                Recipients::Others(room_id) => {
                    self.channels.publish(&room_id, origin, dispatch.event);
                }
                Recipients::Room(room_id) => {
                    self.channels.publish(&room_id, origin, dispatch.event.clone());
                    direct.push(dispatch.event);
                }
            }
        }
        direct
    }

    /// Next event relayed from the room, skipping this connection's own
    ///
    /// Never resolves while the connection is in no room.
    pub async fn next_relayed(&mut self) -> ServerEvent {
        loop {
            let Some(group) = self.group.as_mut() else {
                return std::future::pending().await;
            };
            match group.receiver.recv().await {
                Ok(broadcast) if broadcast.origin == Some(self.ctx.connection_id) => continue,
                Ok(broadcast) => return broadcast.event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        "[Realtime] {} lagged, skipped {} events in {}",
                        self.ctx.user.name,
                        skipped,
                        group.room_id
                    );
                }
                Err(RecvError::Closed) => {
                    self.group = None;
                }
            }
        }
    }

    /// Non-blocking variant of `next_relayed`
    pub fn try_relayed(&mut self) -> Option<ServerEvent> {
        let connection_id = self.ctx.connection_id;
        let group = self.group.as_mut()?;
        loop {
            match group.receiver.try_recv() {
                Ok(broadcast) if broadcast.origin == Some(connection_id) => continue,
                Ok(broadcast) => return Some(broadcast.event),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Transport closed: run disconnect cleanup and publish its notices
    pub async fn close(mut self) {
        let outcome = self.router.disconnect(&mut self.ctx).await;
        self.apply(outcome);
    }
}
