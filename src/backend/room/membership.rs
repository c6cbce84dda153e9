/**
 * Room Membership Authority
 *
 * The single answer to "may this user act in this room right now". Membership
 * is read from the persisted roster on every mutating event rather than cached
 * on the connection, so a user removed between two events (room deleted,
 * deactivated from another tab) loses the right to mutate immediately.
 *
 * The roster rules themselves live in `admit_in_place` / `deactivate_in_place`
 * so the in-memory store and the tests share one definition.
 */

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::backend::room::error::RealtimeError;
use crate::backend::store::{SharedStore, StoreError};
use crate::shared::room::{Participant, ParticipantStatus, Room};

/// Result of an admit-or-reactivate request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmitOutcome {
    /// A new roster entry was appended
    Admitted,
    /// An inactive entry was flipped back to active
    Reactivated,
    /// The user was already active; nothing changed
    AlreadyActive,
    /// The user is not on the roster and the room is at capacity
    RoomFull,
}

impl AdmitOutcome {
    /// Whether the user is an active participant after the request
    pub fn is_member(self) -> bool {
        !matches!(self, AdmitOutcome::RoomFull)
    }
}

/// Apply admit-or-reactivate to a roster
///
/// Reactivation is never blocked by capacity; only appending is.
pub fn admit_in_place(room: &mut Room, user_id: Uuid, now: DateTime<Utc>) -> AdmitOutcome {
    let capacity_left = room.has_capacity();
    if let Some(entry) = room.participants.iter_mut().find(|p| p.user_id == user_id) {
        if entry.is_active() {
            return AdmitOutcome::AlreadyActive;
        }
        entry.status = ParticipantStatus::Active;
        room.updated_at = now;
        return AdmitOutcome::Reactivated;
    }
    if !capacity_left {
        return AdmitOutcome::RoomFull;
    }
    room.participants.push(Participant::active(user_id, now));
    room.updated_at = now;
    AdmitOutcome::Admitted
}

/// Flip a roster entry to inactive; returns whether anything changed
pub fn deactivate_in_place(room: &mut Room, user_id: Uuid, now: DateTime<Utc>) -> bool {
    match room.participants.iter_mut().find(|p| p.user_id == user_id) {
        Some(entry) if entry.is_active() => {
            entry.status = ParticipantStatus::Inactive;
            room.updated_at = now;
            true
        }
        _ => false,
    }
}

/// Store-backed membership checks used by the event handlers
#[derive(Clone)]
pub struct MembershipAuthority {
    store: SharedStore,
}

impl MembershipAuthority {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// True iff the room exists and lists `user_id` as active
    pub async fn is_active_participant(&self, room_id: &str, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(self
            .store
            .find_room(room_id)
            .await?
            .is_some_and(|room| room.is_active_participant(user_id)))
    }

    /// Guard for mutating events
    ///
    /// A missing room is reported as `NotAMember`: the sender cannot be a
    /// member of a room that no longer exists.
    pub async fn require_member(&self, room_id: &str, user_id: Uuid, context: &'static str) -> Result<(), RealtimeError> {
        match self.is_active_participant(room_id, user_id).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                tracing::warn!("[Room] Rejected event from non-member {} in room {}", user_id, room_id);
                Err(RealtimeError::NotAMember)
            }
            Err(e) => {
                tracing::error!("[Room] Membership lookup failed for room {}: {:?}", room_id, e);
                Err(RealtimeError::persistence(context, e))
            }
        }
    }

    /// The only path that adds participants
    pub async fn admit_or_reactivate(
        &self,
        room_id: &str,
        user_id: Uuid,
        user_name: &str,
    ) -> Result<AdmitOutcome, StoreError> {
        let outcome = self.store.admit_participant(room_id, user_id).await?;
        tracing::debug!("[Room] Admit {} ({}) to {}: {:?}", user_name, user_id, room_id, outcome);
        Ok(outcome)
    }

    /// No-op if the user is not on the roster
    pub async fn deactivate(&self, room_id: &str, user_id: Uuid) -> Result<(), StoreError> {
        self.store.deactivate_participant(room_id, user_id).await
    }
}
