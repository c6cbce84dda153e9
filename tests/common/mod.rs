//! Shared test utilities
//!
//! Every suite runs against the in-memory store, so nothing here needs a
//! database or a network.
//!
//! # Module Structure
//!
//! ```text
//! common/
//! ├── mod.rs        - State, user, room and request helpers
//! ├── assertions.rs - Assertion macros
//! └── store.rs      - Store wrapper that fails or pauses chosen operations
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod assertions;
pub mod store;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use codecollab::backend::auth::users::{NewUser, User};
use codecollab::backend::realtime::ConnectionDriver;
use codecollab::backend::routes::create_router;
use codecollab::backend::{AppState, ServerConfig};
use codecollab::shared::room::{Language, Room, DEFAULT_CODE};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Fresh in-memory state with a fixed secret
pub fn test_state() -> AppState {
    AppState::in_memory(ServerConfig {
        jwt_secret: TEST_SECRET.to_string(),
        ..ServerConfig::default()
    })
}

/// State backed by a scripted store the test keeps a handle to
pub fn scripted_state() -> (AppState, Arc<store::ScriptedStore>) {
    let store = Arc::new(store::ScriptedStore::new());
    let config = ServerConfig {
        jwt_secret: TEST_SECRET.to_string(),
        ..ServerConfig::default()
    };
    (AppState::new(config, store.clone()), store)
}

/// Insert a user directly, skipping bcrypt
pub async fn create_user(state: &AppState, name: &str) -> User {
    let new_user = NewUser {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        password_hash: "not-a-real-hash".to_string(),
    };
    assert_ok!(state.store.create_user(new_user).await, "create user")
}

/// Bearer token for a stored user
pub fn token_for(state: &AppState, user: &User) -> String {
    assert_ok!(state.authenticator.tokens().create_token(user.id, &user.email))
}

/// Insert an empty room owned by `creator`
pub async fn create_room(state: &AppState, room_id: &str, creator: &User, max_participants: u32) -> Room {
    let now = Utc::now();
    let room = Room {
        room_id: room_id.to_string(),
        name: format!("Room {}", room_id),
        description: String::new(),
        creator: creator.id,
        participants: Vec::new(),
        current_code: DEFAULT_CODE.to_string(),
        language: Language::Javascript,
        is_active: true,
        max_participants,
        created_at: now,
        updated_at: now,
    };
    assert_ok!(state.store.create_room(room).await, "create room")
}

pub async fn find_room(state: &AppState, room_id: &str) -> Room {
    assert_ok!(state.store.find_room(room_id).await)
        .unwrap_or_else(|| panic!("room {} should exist", room_id))
}

/// A connection driver as the socket task would build it
pub fn connect(state: &AppState, user: &User) -> ConnectionDriver {
    ConnectionDriver::new(user.summary(), state.events.clone(), state.channels.clone())
}

/// Encode a client frame
pub fn frame(event: &str, data: Value) -> String {
    serde_json::json!({ "event": event, "data": data }).to_string()
}

pub fn join_frame(room_id: &str) -> String {
    frame("join_room", serde_json::json!({ "roomId": room_id }))
}

/// Send one request through a fresh router
pub async fn send(state: &AppState, request: Request<Body>) -> Response<Body> {
    assert_ok!(create_router(state.clone()).oneshot(request).await)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    assert_ok!(builder.body(Body::from(body.to_string())))
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    assert_ok!(builder.body(Body::empty()))
}

/// Status and decoded JSON body
pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = assert_ok!(axum::body::to_bytes(response.into_body(), usize::MAX).await);
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        assert_ok!(serde_json::from_slice(&bytes), "response body should be JSON")
    };
    (status, body)
}
