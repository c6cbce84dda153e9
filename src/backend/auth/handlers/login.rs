/**
 * Login Handler
 *
 * POST /api/auth/login
 *
 * # Authentication Process
 *
 * 1. Look up user by (normalized) email
 * 2. Verify password using bcrypt
 * 3. Issue a JWT and set it as the `token` cookie
 *
 * Unknown email and wrong password produce the same 401 so accounts cannot be
 * enumerated.
 */

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest};
use crate::backend::auth::users::{normalize_email, verify_password, User};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Login handler
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, BackendError> {
    let email = normalize_email(&request.email);
    tracing::info!("[Auth] Login request for {}", email);

    let user = state.store.find_user_by_email(&email).await?.ok_or_else(|| {
        tracing::warn!("[Auth] Unknown email: {}", email);
        BackendError::handler(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS)
    })?;

    if !verify_password(&request.password, &user.password_hash) {
        tracing::warn!("[Auth] Invalid password for {}", email);
        return Err(BackendError::handler(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS));
    }

    tracing::info!("[Auth] User logged in: {} ({})", user.name, user.email);
    issue_session(&state, &user, StatusCode::OK)
}

/// Token response plus `token` cookie
pub(crate) fn issue_session(
    state: &AppState,
    user: &User,
    status: StatusCode,
) -> Result<impl IntoResponse, BackendError> {
    let token = state
        .authenticator
        .tokens()
        .create_token(user.id, &user.email)
        .map_err(|e| {
            tracing::error!("[Auth] Failed to create token: {:?}", e);
            BackendError::state("Failed to create token")
        })?;
    let cookie = format!("token={}; Path=/; HttpOnly; SameSite=Lax", token);
    let body = AuthResponse {
        user: user.summary(),
        token,
    };
    Ok((status, [(header::SET_COOKIE, cookie)], Json(body)))
}
