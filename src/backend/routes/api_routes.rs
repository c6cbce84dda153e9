/**
 * API Routes
 *
 * # Routes
 *
 * ## Public
 * - `POST /api/auth/register` - User registration
 * - `POST /api/auth/login` - User login
 *
 * ## Authenticated (`auth_middleware`)
 * - `GET /api/auth/profile` - Current user
 * - `/api/rooms/...` - Room management and chat history
 * - `/api/code/...` - Versioned code saves
 * - `POST /api/ai/{suggest,review,explain,fix}` - AI assistant
 */

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::backend::ai::handlers as ai;
use crate::backend::api::{code, rooms};
use crate::backend::auth::{login, profile, register};
use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;

/// Add every `/api` route to the router
pub fn configure_api_routes(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login));

    let protected = Router::new()
        .route("/api/auth/profile", get(profile))
        // Rooms
        .route("/api/rooms", post(rooms::create_room).get(rooms::list_rooms))
        .route("/api/rooms/{room_id}", get(rooms::get_room).delete(rooms::delete_room))
        .route("/api/rooms/{room_id}/join", post(rooms::join_room))
        .route("/api/rooms/{room_id}/leave", post(rooms::leave_room))
        .route("/api/rooms/{room_id}/messages", get(rooms::room_messages))
        // Code
        .route("/api/code/{room_id}", post(code::save_code))
        .route("/api/code/{room_id}/history", get(code::code_history))
        .route("/api/code/{room_id}/current", get(code::current_code))
        .route("/api/code/{room_id}/version/{version}", get(code::code_version))
        // AI assistant
        .route("/api/ai/suggest", post(ai::suggest))
        .route("/api/ai/review", post(ai::review))
        .route("/api/ai/explain", post(ai::explain))
        .route("/api/ai/fix", post(ai::fix))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    router.merge(public).merge(protected)
}
