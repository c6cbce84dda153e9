/**
 * Authentication Middleware
 *
 * Protects routes that require a logged-in user. The token is taken from the
 * `Authorization: Bearer` header or the `token` cookie, verified, and resolved
 * to a stored user whose public profile is attached to the request
 * extensions for handlers to pick up through `AuthUser`.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::backend::auth::credentials::{extract_token, AuthError};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::user::UserSummary;

/// Authenticated user attached by `auth_middleware`
#[derive(Clone, Debug)]
pub struct AuthenticatedUser(pub UserSummary);

/// Authentication middleware
///
/// Returns 401 when the token is missing, invalid, or names no user.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = extract_token(request.headers(), None).map(str::to_owned);
    let user = state.authenticator.authenticate(token.as_deref()).await?;

    request.extensions_mut().insert(AuthenticatedUser(user.summary()));
    Ok(next.run(request).await)
}

/// Axum extractor for the authenticated user
#[derive(Clone, Debug)]
pub struct AuthUser(pub UserSummary);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("[Auth] AuthenticatedUser not found in request extensions");
                BackendError::from(AuthError::MissingToken)
            })?;
        Ok(AuthUser(user.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::server::config::ServerConfig;
    use crate::backend::server::state::AppState;
    use crate::shared::user::DEFAULT_AVATAR;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn test_extractor_reads_extension() {
        let state = AppState::in_memory(ServerConfig::default());
        let (mut parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();
        let user = UserSummary {
            id: uuid::Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            avatar: DEFAULT_AVATAR.to_string(),
        };
        parts.extensions.insert(AuthenticatedUser(user.clone()));

        let AuthUser(extracted) = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(extracted, user);
    }

    #[tokio::test]
    async fn test_extractor_without_middleware_is_unauthorized() {
        let state = AppState::in_memory(ServerConfig::default());
        let (mut parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();

        let err = AuthUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
