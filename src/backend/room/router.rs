/**
 * Realtime Event Router
 *
 * Connection-level state machine:
 *
 * ```text
 * unauthenticated ──handshake──▶ authenticated (no room) ──join_room──▶ in-room
 *                                        ▲                                │
 *                                        └────── leave_room / disconnect ─┘
 * ```
 *
 * The handshake happens in the transport; by the time an event reaches
 * `EventRouter::handle` the connection carries a verified identity in its
 * `ConnectionContext`. Every failure is recovered here and reported to the
 * sender as an error event.
 */

use uuid::Uuid;

use crate::backend::room::handlers::{chat, code, join, leave, presence, signaling};
use crate::backend::room::membership::MembershipAuthority;
use crate::backend::room::outcome::Outcome;
use crate::backend::room::session::SessionDirectory;
use crate::backend::store::SharedStore;
use crate::shared::event::{ClientEvent, ServerEvent};
use crate::shared::user::UserSummary;

/// Per-connection state passed to every handler
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub connection_id: Uuid,
    /// Identity bound at handshake; never re-verified
    pub user: UserSummary,
    /// Room this connection has joined, if any
    pub room_id: Option<String>,
}

impl ConnectionContext {
    pub fn new(user: UserSummary) -> Self {
        Self {
            connection_id: Uuid::new_v4(),
            user,
            room_id: None,
        }
    }
}

/// Dispatches client events to their handlers
#[derive(Clone)]
pub struct EventRouter {
    pub(crate) store: SharedStore,
    pub(crate) sessions: SessionDirectory,
    pub(crate) membership: MembershipAuthority,
}

impl EventRouter {
    pub fn new(store: SharedStore, sessions: SessionDirectory) -> Self {
        let membership = MembershipAuthority::new(store.clone());
        Self {
            store,
            sessions,
            membership,
        }
    }

    pub fn sessions(&self) -> &SessionDirectory {
        &self.sessions
    }

    /// Handle one event to completion
    pub async fn handle(&self, ctx: &mut ConnectionContext, event: ClientEvent) -> Outcome {
        let name = event.name();
        tracing::debug!(
            "[Realtime] {} for {} from {} ({})",
            name,
            event.room_id(),
            ctx.user.name,
            ctx.connection_id
        );

        let result = match event {
            ClientEvent::JoinRoom(r) => join::join_room(self, ctx, &r.room_id).await,
            ClientEvent::CodeChange(change) => code::code_change(self, ctx, change).await,
            ClientEvent::CursorPosition(cursor) => presence::cursor_position(self, ctx, cursor).await,
            ClientEvent::SendMessage(message) => chat::send_message(self, ctx, message).await,
            ClientEvent::LanguageChange(change) => code::language_change(self, ctx, change).await,
            ClientEvent::WebrtcOffer(s) => Ok(signaling::relay(self, ctx, s, ServerEvent::WebrtcOffer).await),
            ClientEvent::WebrtcAnswer(s) => Ok(signaling::relay(self, ctx, s, ServerEvent::WebrtcAnswer).await),
            ClientEvent::WebrtcIceCandidate(s) => {
                Ok(signaling::relay(self, ctx, s, ServerEvent::WebrtcIceCandidate).await)
            }
            ClientEvent::TypingStart(r) => Ok(presence::typing(ctx, &r.room_id, true)),
            ClientEvent::TypingStop(r) => Ok(presence::typing(ctx, &r.room_id, false)),
            ClientEvent::StartCall(r) => Ok(signaling::call(self, ctx, &r.room_id, true).await),
            ClientEvent::EndCall(r) => Ok(signaling::call(self, ctx, &r.room_id, false).await),
            ClientEvent::LeaveRoom(r) => Ok(leave::leave_room(self, ctx, &r.room_id).await),
        };

        result.unwrap_or_else(|err| {
            tracing::warn!("[Realtime] {} from {} failed: {}", name, ctx.user.name, err);
            Outcome::to_sender(err.to_event())
        })
    }

    /// Cleanup for a connection whose transport closed
    pub async fn disconnect(&self, ctx: &mut ConnectionContext) -> Outcome {
        leave::disconnect(self, ctx).await
    }
}
