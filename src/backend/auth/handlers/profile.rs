/**
 * Profile Handler
 *
 * GET /api/auth/profile, behind `auth_middleware`. Returns the public profile
 * of the authenticated user; the password hash never leaves the server.
 */

use axum::response::Json;

use crate::backend::middleware::AuthUser;
use crate::shared::user::UserSummary;

pub async fn profile(AuthUser(user): AuthUser) -> Json<UserSummary> {
    Json(user)
}
