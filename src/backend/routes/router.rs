/**
 * Router Configuration
 *
 * Assembles every route into one Axum router and applies the cross-cutting
 * layers (CORS, request tracing).
 *
 * # Routes
 *
 * - `GET /health` - Liveness probe
 * - `GET /ws` - WebSocket endpoint for realtime collaboration
 * - `/api/...` - REST API (see `api_routes`)
 * - Anything else - 404 JSON error
 */

use axum::{
    http::{header, HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::error::BackendError;
use crate::backend::realtime::ws_handler;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler));

    let router = configure_api_routes(router, &app_state);

    let cors = cors_layer(&app_state.config.cors_origin);
    router
        .fallback(|| async { BackendError::not_found("Not found") })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);
    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!("[Server] Ignoring invalid CORS origin {:?}", origin);
            layer
        }
    }
}
