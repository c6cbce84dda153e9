/**
 * Buffer and Language Handlers
 *
 * `code_change` overwrites the room's whole buffer: the last write to commit
 * wins and is what a later joiner sees in `room_data`. No merge is attempted.
 * `language_change` overwrites the language tag the same way.
 */

use chrono::Utc;

use crate::backend::room::error::RealtimeError;
use crate::backend::room::outcome::Outcome;
use crate::backend::room::router::{ConnectionContext, EventRouter};
use crate::shared::event::{CodeChange, CodeUpdate, LanguageChange, LanguageUpdated, ServerEvent};
use crate::shared::room::Language;

pub async fn code_change(router: &EventRouter, ctx: &ConnectionContext, change: CodeChange) -> Result<Outcome, RealtimeError> {
    const CONTEXT: &str = "Failed to update code";

    router.membership.require_member(&change.room_id, ctx.user.id, CONTEXT).await?;

    router
        .store
        .update_code(&change.room_id, &change.code)
        .await
        .map_err(|e| {
            tracing::error!("[Room] Failed to persist code for room {}: {:?}", change.room_id, e);
            RealtimeError::persistence(CONTEXT, e)
        })?;

    tracing::debug!(
        "[Room] {} updated code in {} ({} bytes)",
        ctx.user.name,
        change.room_id,
        change.code.len()
    );
    Ok(Outcome::to_others(
        &change.room_id,
        ServerEvent::CodeUpdate(CodeUpdate {
            code: change.code,
            user_id: ctx.user.id,
            user_name: ctx.user.name.clone(),
            time_stamp: Utc::now(),
        }),
    ))
}

pub async fn language_change(
    router: &EventRouter,
    ctx: &ConnectionContext,
    change: LanguageChange,
) -> Result<Outcome, RealtimeError> {
    const CONTEXT: &str = "Failed to change language";

    router.membership.require_member(&change.room_id, ctx.user.id, CONTEXT).await?;
    let language: Language = change.language.parse()?;

    router
        .store
        .update_language(&change.room_id, language)
        .await
        .map_err(|e| {
            tracing::error!("[Room] Failed to persist language for room {}: {:?}", change.room_id, e);
            RealtimeError::persistence(CONTEXT, e)
        })?;

    tracing::info!("[Room] {} switched room {} to {}", ctx.user.name, change.room_id, language);
    Ok(Outcome::to_room(
        &change.room_id,
        ServerEvent::LanguageUpdated(LanguageUpdated {
            language,
            changed_by: ctx.user.name.clone(),
        }),
    ))
}
