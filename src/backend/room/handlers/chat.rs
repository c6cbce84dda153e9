/**
 * Chat Handler
 *
 * Persists the message first, then fans the stored record (with the sender's
 * public profile) out to the whole room, the sender included, so every client
 * renders the same id and timestamp.
 */

use crate::backend::room::error::RealtimeError;
use crate::backend::room::outcome::Outcome;
use crate::backend::room::router::{ConnectionContext, EventRouter};
use crate::shared::event::{SendMessage, ServerEvent};
use crate::shared::message::normalize_message_text;

pub async fn send_message(router: &EventRouter, ctx: &ConnectionContext, request: SendMessage) -> Result<Outcome, RealtimeError> {
    const CONTEXT: &str = "Failed to send message";

    router.membership.require_member(&request.room_id, ctx.user.id, CONTEXT).await?;
    let content = normalize_message_text(&request.message)?;

    let message = router
        .store
        .append_message(&request.room_id, &ctx.user, &content)
        .await
        .map_err(|e| {
            tracing::error!("[Room] Failed to store message in room {}: {:?}", request.room_id, e);
            RealtimeError::persistence(CONTEXT, e)
        })?;

    tracing::debug!("[Room] {} sent message {} in {}", ctx.user.name, message.id, request.room_id);
    Ok(Outcome::to_room(&request.room_id, ServerEvent::ReceiveMessage(message)))
}
