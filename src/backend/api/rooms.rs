/**
 * Room Handlers
 *
 * REST surface for room management. These are thin wrappers over the store;
 * the realtime layer reads and writes the same records.
 *
 * # Routes
 *
 * - `POST   /api/rooms`                  - Create a room (creator admitted)
 * - `GET    /api/rooms`                  - Rooms the caller participates in
 * - `GET    /api/rooms/{roomId}`         - One room
 * - `POST   /api/rooms/{roomId}/join`    - Join or rejoin a room
 * - `POST   /api/rooms/{roomId}/leave`   - Mark the caller inactive
 * - `DELETE /api/rooms/{roomId}`         - Soft delete (creator only)
 * - `GET    /api/rooms/{roomId}/messages` - Chat history, oldest first
 */

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::room::AdmitOutcome;
use crate::backend::server::state::AppState;
use crate::shared::message::ChatMessage;
use crate::shared::room::{Language, Participant, Room, DEFAULT_CODE};

/// Chat history page size when none is given
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
/// Largest accepted chat history page
pub const MAX_HISTORY_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

async fn load_room(state: &AppState, room_id: &str) -> Result<Room, BackendError> {
    state
        .store
        .find_room(room_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Room not found"))
}

pub async fn create_room(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<Room>), BackendError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(BackendError::bad_request("Room name is required"));
    }
    let language = match request.language.as_deref().filter(|l| !l.is_empty()) {
        Some(tag) => tag.parse::<Language>()?,
        None => Language::default(),
    };

    let now = Utc::now();
    let room = Room {
        room_id: Room::generate_id(),
        name: name.to_string(),
        description: request.description.unwrap_or_default(),
        creator: user.id,
        participants: vec![Participant::active(user.id, now)],
        current_code: DEFAULT_CODE.to_string(),
        language,
        is_active: true,
        max_participants: state.config.default_max_participants,
        created_at: now,
        updated_at: now,
    };
    let room = state.store.create_room(room).await?;

    tracing::info!("[Room] {} created room {} ({})", user.name, room.room_id, room.name);
    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn list_rooms(State(state): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<Vec<Room>>, BackendError> {
    Ok(Json(state.store.rooms_for_user(user.id).await?))
}

pub async fn get_room(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(room_id): Path<String>,
) -> Result<Json<Room>, BackendError> {
    Ok(Json(load_room(&state, &room_id).await?))
}

pub async fn join_room(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<String>,
) -> Result<Json<Room>, BackendError> {
    let room = load_room(&state, &room_id).await?;
    if room.is_active_participant(user.id) {
        return Err(BackendError::bad_request("Already in room"));
    }

    match state.store.admit_participant(&room_id, user.id).await? {
        AdmitOutcome::RoomFull => return Err(BackendError::bad_request("Room is full")),
        AdmitOutcome::AlreadyActive => return Err(BackendError::bad_request("Already in room")),
        outcome => tracing::info!("[Room] {} joined room {} over HTTP ({:?})", user.name, room_id, outcome),
    }

    Ok(Json(load_room(&state, &room_id).await?))
}

pub async fn leave_room(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<String>,
) -> Result<Json<serde_json::Value>, BackendError> {
    let room = load_room(&state, &room_id).await?;
    if room.participant(user.id).is_none() {
        return Err(BackendError::bad_request("Not in room"));
    }
    state.store.deactivate_participant(&room_id, user.id).await?;

    tracing::info!("[Room] {} left room {} over HTTP", user.name, room_id);
    Ok(Json(serde_json::json!({ "message": "Left room" })))
}

pub async fn delete_room(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<String>,
) -> Result<Json<serde_json::Value>, BackendError> {
    let room = load_room(&state, &room_id).await?;
    if room.creator != user.id {
        tracing::warn!("[Room] {} tried to delete room {} they did not create", user.name, room_id);
        return Err(BackendError::handler(
            StatusCode::FORBIDDEN,
            "Only the room creator can delete this room",
        ));
    }
    state.store.deactivate_room(&room_id).await?;

    tracing::info!("[Room] {} deleted room {}", user.name, room_id);
    Ok(Json(serde_json::json!({ "message": "Room deleted" })))
}

pub async fn room_messages(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ChatMessage>>, BackendError> {
    let room = load_room(&state, &room_id).await?;
    if room.participant(user.id).is_none() {
        return Err(BackendError::handler(StatusCode::FORBIDDEN, "Not a participant of this room"));
    }
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, MAX_HISTORY_LIMIT);
    Ok(Json(state.store.recent_messages(&room_id, limit).await?))
}
