/**
 * Leave and Disconnect Handlers
 *
 * Both are best-effort: store failures are logged and swallowed, and the
 * connection always drops its session entry and broadcast group. The persisted
 * participant is only deactivated once the user has no other live connection
 * in the room, so closing one tab does not mark a user offline while another
 * tab is still editing.
 */

use uuid::Uuid;

use crate::backend::room::outcome::Outcome;
use crate::backend::room::router::{ConnectionContext, EventRouter};
use crate::shared::event::{PresenceNotice, ServerEvent};

/// Explicit `leave_room`
pub async fn leave_room(router: &EventRouter, ctx: &mut ConnectionContext, room_id: &str) -> Outcome {
    if ctx.room_id.as_deref() == Some(room_id) {
        router.sessions.remove(ctx.connection_id).await;
        ctx.room_id = None;
    }
    release(router, room_id, ctx.user.id, &ctx.user.name).await;

    tracing::info!("[Room] {} left room {}", ctx.user.name, room_id);
    Outcome::none()
        .leave_group(room_id)
        .then(Outcome::to_others(
            room_id,
            ServerEvent::UserLeft(PresenceNotice {
                user_id: ctx.user.id,
                user_name: ctx.user.name.clone(),
                message: format!("{} left the room", ctx.user.name),
            }),
        ))
}

/// Transport-level disconnect; no-op unless the connection had joined a room
pub async fn disconnect(router: &EventRouter, ctx: &mut ConnectionContext) -> Outcome {
    let Some(session) = router.sessions.remove(ctx.connection_id).await else {
        tracing::debug!("[Room] Connection {} closed without a room", ctx.connection_id);
        return Outcome::none();
    };
    ctx.room_id = None;
    release(router, &session.room_id, session.user_id, &session.user_name).await;

    tracing::info!("[Room] {} disconnected from room {}", session.user_name, session.room_id);
    Outcome::none()
        .leave_group(&session.room_id)
        .then(Outcome::to_others(
            &session.room_id,
            ServerEvent::UserLeft(PresenceNotice {
                user_id: session.user_id,
                user_name: session.user_name.clone(),
                message: format!("{} disconnected", session.user_name),
            }),
        ))
}

/// Deactivate the participant unless another live connection still holds the room
async fn release(router: &EventRouter, room_id: &str, user_id: Uuid, user_name: &str) {
    let remaining = router.sessions.live_sessions(user_id, room_id).await;
    if remaining > 0 {
        tracing::debug!(
            "[Room] {} still has {} live connection(s) in {}, keeping participant active",
            user_name,
            remaining,
            room_id
        );
        return;
    }
    if let Err(e) = router.membership.deactivate(room_id, user_id).await {
        tracing::error!("[Room] Failed to deactivate {} in room {}: {:?}", user_name, room_id, e);
        return;
    }

    // Another tab may have joined while the deactivation was in flight
    if router.sessions.live_sessions(user_id, room_id).await > 0 {
        tracing::debug!("[Room] {} rejoined {} during release, reactivating", user_name, room_id);
        if let Err(e) = router.membership.admit_or_reactivate(room_id, user_id, user_name).await {
            tracing::error!("[Room] Failed to reactivate {} in room {}: {:?}", user_name, room_id, e);
        }
    }
}
