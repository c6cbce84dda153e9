/**
 * Presence Handlers
 *
 * Cursor moves and typing indicators. Nothing is persisted; both are relayed
 * to the other connections in the room only.
 */

use crate::backend::room::error::RealtimeError;
use crate::backend::room::outcome::Outcome;
use crate::backend::room::router::{ConnectionContext, EventRouter};
use crate::shared::event::{CursorMove, CursorUpdate, ServerEvent, TypingNotice};

pub async fn cursor_position(router: &EventRouter, ctx: &ConnectionContext, cursor: CursorMove) -> Result<Outcome, RealtimeError> {
    router
        .membership
        .require_member(&cursor.room_id, ctx.user.id, "Failed to update cursor")
        .await?;

    Ok(Outcome::to_others(
        &cursor.room_id,
        ServerEvent::CursorUpdate(CursorUpdate {
            position: cursor.position,
            user_id: ctx.user.id,
            user_name: ctx.user.name.clone(),
        }),
    ))
}

/// Typing indicators carry no precondition and never fail
pub fn typing(ctx: &ConnectionContext, room_id: &str, is_typing: bool) -> Outcome {
    Outcome::to_others(
        room_id,
        ServerEvent::UserTyping(TypingNotice {
            user_name: ctx.user.name.clone(),
            is_typing,
        }),
    )
}
