/**
 * Join Handler
 *
 * `join_room` is the only event accepted from a connection that has not
 * joined anything yet, and the only path that adds a participant.
 *
 * # Flow
 *
 * 1. Resolve the room (missing or soft-deleted ⇒ `room_found_error`)
 * 2. Record the connection session in the new room
 * 3. Admit or reactivate the sender on the persisted roster
 * 4. Leave the previous room if the connection was elsewhere
 * 5. Enter the room's broadcast group
 * 6. Announce the join to the others and send the snapshot to the sender
 *
 * The session is recorded before the roster write so that another tab of the
 * same user releasing the room concurrently sees this connection as live and
 * keeps the participant active. A failed admit restores the previous session
 * entry, so steps 1 to 3 abort with no state change.
 */

use chrono::Utc;

use crate::backend::room::error::RealtimeError;
use crate::backend::room::handlers::leave;
use crate::backend::room::membership::{admit_in_place, AdmitOutcome};
use crate::backend::room::outcome::{Outcome, Recipients};
use crate::backend::room::router::{ConnectionContext, EventRouter};
use crate::shared::event::{PresenceNotice, ServerEvent};

const CONTEXT: &str = "Failed to join room";

pub async fn join_room(router: &EventRouter, ctx: &mut ConnectionContext, room_id: &str) -> Result<Outcome, RealtimeError> {
    let room = router
        .store
        .find_room(room_id)
        .await
        .map_err(|e| {
            tracing::error!("[Room] Lookup of room {} failed: {:?}", room_id, e);
            RealtimeError::persistence(CONTEXT, e)
        })?
        .ok_or_else(|| {
            tracing::warn!("[Room] {} tried to join unknown room {}", ctx.user.name, room_id);
            RealtimeError::RoomNotFound
        })?;

    router
        .sessions
        .put(ctx.connection_id, ctx.user.id, ctx.user.name.clone(), room_id)
        .await;

    let admitted = match router
        .membership
        .admit_or_reactivate(&room.room_id, ctx.user.id, &ctx.user.name)
        .await
    {
        Ok(AdmitOutcome::RoomFull) => {
            tracing::warn!("[Room] Room {} is full, rejected {}", room_id, ctx.user.name);
            restore_session(router, ctx).await;
            return Err(RealtimeError::RoomFull);
        }
        Ok(admitted) => admitted,
        Err(e) => {
            tracing::error!("[Room] Admit to room {} failed: {:?}", room_id, e);
            restore_session(router, ctx).await;
            return Err(RealtimeError::persistence(CONTEXT, e));
        }
    };

    // The session entry already points at the new room, so leaving the
    // previous one must not remove it
    let previous = ctx.room_id.replace(room_id.to_string());
    let mut outcome = Outcome::none();
    if let Some(previous) = previous.filter(|prev| prev != room_id) {
        tracing::debug!("[Room] {} switching from {} to {}", ctx.user.name, previous, room_id);
        outcome = outcome.then(leave::leave_room(router, ctx, &previous).await);
    }

    // Re-read so the snapshot carries the roster as written
    let snapshot = match router.store.find_room(room_id).await {
        Ok(Some(current)) => current.snapshot(),
        reread => {
            if let Err(e) = reread {
                tracing::warn!("[Room] Snapshot re-read for room {} failed: {:?}", room_id, e);
            }
            let mut local = room;
            admit_in_place(&mut local, ctx.user.id, Utc::now());
            local.snapshot()
        }
    };

    tracing::info!("[Room] {} joined room {} ({:?})", ctx.user.name, room_id, admitted);

    Ok(outcome
        .join_group(room_id)
        .send(
            Recipients::Others(room_id.to_string()),
            ServerEvent::UserJoined(PresenceNotice {
                user_id: ctx.user.id,
                user_name: ctx.user.name.clone(),
                message: format!("{} joined the room", ctx.user.name),
            }),
        )
        .send(Recipients::Sender, ServerEvent::RoomData(snapshot)))
}

/// Put the connection's session entry back the way it was before a failed join
async fn restore_session(router: &EventRouter, ctx: &ConnectionContext) {
    match &ctx.room_id {
        Some(previous) => {
            router
                .sessions
                .put(ctx.connection_id, ctx.user.id, ctx.user.name.clone(), previous)
                .await;
        }
        None => {
            router.sessions.remove(ctx.connection_id).await;
        }
    }
}
