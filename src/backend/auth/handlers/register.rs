/**
 * Register Handler
 *
 * POST /api/auth/register
 *
 * # Validation
 *
 * - Name must be non-empty after trimming
 * - Email must look like `local@domain.tld`
 * - Password must be at least `MIN_PASSWORD_LEN` characters
 * - Email must not belong to an existing account
 *
 * On success the new account is logged in immediately (201 + token cookie).
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::backend::auth::handlers::login::issue_session;
use crate::backend::auth::handlers::types::RegisterRequest;
use crate::backend::auth::users::{hash_password, is_valid_email, normalize_email, NewUser, MIN_PASSWORD_LEN};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::store::StoreError;

/// Register handler
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, BackendError> {
    let name = request.name.trim();
    let email = normalize_email(&request.email);
    tracing::info!("[Auth] Register request for {}", email);

    if name.is_empty() {
        return Err(BackendError::bad_request("Name is required"));
    }
    if !is_valid_email(&email) {
        return Err(BackendError::bad_request("Invalid email format"));
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(BackendError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let password_hash = hash_password(&request.password).map_err(|e| {
        tracing::error!("[Auth] Failed to hash password: {:?}", e);
        BackendError::state("Failed to hash password")
    })?;

    let new_user = NewUser {
        name: name.to_string(),
        email,
        password_hash,
    };
    let user = match state.store.create_user(new_user).await {
        Ok(user) => user,
        Err(StoreError::Conflict { .. }) => return Err(BackendError::bad_request("User already exists")),
        Err(e) => return Err(e.into()),
    };

    tracing::info!("[Auth] User registered: {} ({})", user.name, user.id);
    issue_session(&state, &user, StatusCode::CREATED)
}
