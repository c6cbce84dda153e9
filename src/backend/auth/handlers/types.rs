/**
 * Authentication Handler Types
 *
 * Request and response bodies shared by the register, login and profile
 * handlers.
 */

use serde::{Deserialize, Serialize};

use crate::shared::user::UserSummary;

/// Registration request
#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    /// Display name (non-empty)
    pub name: String,
    pub email: String,
    /// Plain password, at least `MIN_PASSWORD_LEN` characters
    pub password: String,
}

/// Login request
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by register and login
///
/// ```json
/// { "_id": "...", "name": "Ada", "email": "ada@example.com", "avatar": "", "token": "eyJ..." }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: UserSummary,
    pub token: String,
}
