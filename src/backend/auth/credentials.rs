/**
 * Credential Resolution
 *
 * Turns a request's credentials into a stored user. Shared by the HTTP auth
 * middleware and the WebSocket handshake so both accept exactly the same
 * tokens.
 *
 * # Lookup Order
 *
 * 1. `Authorization: Bearer <token>` header
 * 2. `token` query parameter (browsers cannot set headers on a WebSocket)
 * 3. `token` cookie
 */

use axum::http::{header, HeaderMap};
use std::collections::HashMap;
use thiserror::Error;

use crate::backend::auth::tokens::TokenService;
use crate::backend::auth::users::User;
use crate::backend::store::{SharedStore, StoreError};

/// Why a request could not be authenticated
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not authorized, no token")]
    MissingToken,

    #[error("Not authorized, token failed")]
    InvalidToken,

    #[error("Not authorized, user not found")]
    UnknownUser,

    /// The user lookup itself failed
    #[error("User lookup failed: {0}")]
    Lookup(#[from] StoreError),
}

/// Token from the `Authorization: Bearer` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Token from already-decoded query parameters
pub fn query_token(params: &HashMap<String, String>) -> Option<&str> {
    params
        .get("token")
        .map(String::as_str)
        .filter(|token| !token.is_empty())
}

/// Token from the `token` cookie
pub fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == "token")
        .map(|(_, value)| value)
        .filter(|token| !token.is_empty())
}

/// First token found in header, query, then cookie
pub fn extract_token<'a>(
    headers: &'a HeaderMap,
    query: Option<&'a HashMap<String, String>>,
) -> Option<&'a str> {
    bearer_token(headers)
        .or_else(|| query.and_then(query_token))
        .or_else(|| cookie_token(headers))
}

/// Resolves tokens to stored users
#[derive(Clone)]
pub struct Authenticator {
    tokens: TokenService,
    store: SharedStore,
}

impl Authenticator {
    pub fn new(tokens: TokenService, store: SharedStore) -> Self {
        Self { tokens, store }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Verify a token and load the user it names
    pub async fn authenticate(&self, token: Option<&str>) -> Result<User, AuthError> {
        let token = token.ok_or(AuthError::MissingToken)?;
        let claims = self.tokens.verify_token(token).map_err(|e| {
            tracing::warn!("[Auth] Invalid token: {}", e);
            AuthError::InvalidToken
        })?;
        let user_id = claims.user_id().ok_or(AuthError::InvalidToken)?;
        self.store.find_user(user_id).await?.ok_or_else(|| {
            tracing::warn!("[Auth] Token for unknown user {}", user_id);
            AuthError::UnknownUser
        })
    }
}
