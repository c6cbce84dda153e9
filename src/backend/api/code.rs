/**
 * Code Handlers
 *
 * Manual, versioned saves of a room's buffer. Realtime edits overwrite the
 * room's current content without creating versions; a save does both, so the
 * two paths share last-writer-wins on the live buffer.
 *
 * # Routes
 *
 * - `POST /api/code/{roomId}`                    - Save a new version
 * - `GET  /api/code/{roomId}/history`            - Versions, newest first
 * - `GET  /api/code/{roomId}/current`            - Live content and language
 * - `GET  /api/code/{roomId}/version/{version}`  - One version
 */

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::message::CodeSnapshot;
use crate::shared::room::{Language, Room};

const DEFAULT_CHANGE_DESCRIPTION: &str = "Code Updated";
const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCodeRequest {
    pub content: Option<String>,
    pub language: Option<String>,
    pub change_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub codes: Vec<CodeSnapshot>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentCode {
    pub content: String,
    pub language: Language,
}

async fn load_room(state: &AppState, room_id: &str) -> Result<Room, BackendError> {
    state
        .store
        .find_room(room_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Room not found"))
}

pub async fn save_code(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<String>,
    Json(request): Json<SaveCodeRequest>,
) -> Result<(StatusCode, Json<CodeSnapshot>), BackendError> {
    let room = load_room(&state, &room_id).await?;
    if !room.is_active_participant(user.id) {
        return Err(BackendError::handler(
            StatusCode::FORBIDDEN,
            "You are not an active participant of this room",
        ));
    }
    let content = request
        .content
        .ok_or_else(|| BackendError::bad_request("Content is required"))?;
    let language = match request.language.as_deref().filter(|l| !l.is_empty()) {
        Some(tag) => tag.parse::<Language>()?,
        None => room.language,
    };
    let description = request
        .change_description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CHANGE_DESCRIPTION.to_string());

    let snapshot = state
        .store
        .save_snapshot(&room_id, &content, language, &user, &description)
        .await?;
    state.store.update_code(&room_id, &content).await?;
    if language != room.language {
        state.store.update_language(&room_id, language).await?;
    }

    tracing::info!("[Code] {} saved version {} of room {}", user.name, snapshot.version, room_id);
    Ok((StatusCode::CREATED, Json(snapshot)))
}

pub async fn code_history(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(room_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, BackendError> {
    load_room(&state, &room_id).await?;
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let result = state.store.snapshot_history(&room_id, page, limit).await?;
    Ok(Json(HistoryResponse {
        codes: result.snapshots,
        total_pages: result.total.div_ceil(u64::from(limit)),
        current_page: page,
        total: result.total,
    }))
}

pub async fn current_code(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(room_id): Path<String>,
) -> Result<Json<CurrentCode>, BackendError> {
    let room = load_room(&state, &room_id).await?;
    Ok(Json(CurrentCode {
        content: room.current_code,
        language: room.language,
    }))
}

pub async fn code_version(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path((room_id, version)): Path<(String, i64)>,
) -> Result<Json<CodeSnapshot>, BackendError> {
    load_room(&state, &room_id).await?;
    state
        .store
        .snapshot_version(&room_id, version)
        .await?
        .map(Json)
        .ok_or_else(|| BackendError::not_found("Version not found"))
}
