/**
 * Call Signaling Handlers
 *
 * WebRTC offers, answers and ICE candidates are relayed untouched to the rest
 * of the room; `start_call` / `end_call` announce a call. None of them has a
 * persisted side effect, so a sender that fails the membership check is
 * dropped silently instead of receiving an error event.
 */

use crate::backend::room::outcome::Outcome;
use crate::backend::room::router::{ConnectionContext, EventRouter};
use crate::shared::event::{CallNotice, ServerEvent, Signal, SignalRelay};

/// Relay a signaling payload; `wrap` picks the outgoing event name
pub async fn relay(
    router: &EventRouter,
    ctx: &ConnectionContext,
    signal: Signal,
    wrap: fn(SignalRelay) -> ServerEvent,
) -> Outcome {
    if !allowed(router, ctx, &signal.room_id).await {
        return Outcome::none();
    }
    Outcome::to_others(
        &signal.room_id,
        wrap(SignalRelay {
            payload: signal.payload,
            user_id: ctx.user.id,
        }),
    )
}

/// `start_call` when `started`, otherwise `end_call`
pub async fn call(router: &EventRouter, ctx: &ConnectionContext, room_id: &str, started: bool) -> Outcome {
    if !allowed(router, ctx, room_id).await {
        return Outcome::none();
    }
    let notice = CallNotice {
        user_id: ctx.user.id,
        user_name: ctx.user.name.clone(),
    };
    tracing::info!(
        "[Room] {} {} a call in {}",
        ctx.user.name,
        if started { "started" } else { "ended" },
        room_id
    );
    let event = if started {
        ServerEvent::CallStarted(notice)
    } else {
        ServerEvent::CallEnded(notice)
    };
    Outcome::to_others(room_id, event)
}

async fn allowed(router: &EventRouter, ctx: &ConnectionContext, room_id: &str) -> bool {
    match router.membership.is_active_participant(room_id, ctx.user.id).await {
        Ok(true) => true,
        Ok(false) => {
            tracing::debug!("[Room] Dropped signaling from non-member {} in {}", ctx.user.name, room_id);
            false
        }
        Err(e) => {
            tracing::error!("[Room] Membership lookup for signaling in {} failed: {:?}", room_id, e);
            false
        }
    }
}
