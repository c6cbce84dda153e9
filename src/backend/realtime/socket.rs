/**
 * WebSocket Endpoint
 *
 * GET /ws
 *
 * # Handshake
 *
 * The credential token is verified before the upgrade. A missing, invalid or
 * orphaned token gets a plain 401 and no socket is opened, so no event is ever
 * processed for an unauthenticated connection.
 *
 * # Connection Loop
 *
 * One task per connection, selecting between:
 *
 * - the next client frame, handled to completion before the next is read
 * - the next event relayed from the joined room's broadcast channel
 *
 * When the socket closes (cleanly or not) the driver runs disconnect cleanup.
 */

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        rejection::QueryRejection,
        Query, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use std::collections::HashMap;

use crate::backend::auth::credentials::extract_token;
use crate::backend::error::BackendError;
use crate::backend::realtime::connection::ConnectionDriver;
use crate::backend::server::state::AppState;
use crate::shared::event::ServerEvent;

/// WebSocket upgrade handler
pub async fn ws_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    // An undecodable query string only loses the query token
    let params = query.map(|Query(params)| params).unwrap_or_default();
    let token = extract_token(&headers, Some(&params));
    let user = match state.authenticator.authenticate(token).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("[Realtime] Rejected handshake: {}", e);
            return BackendError::from(e).into_response();
        }
    };

    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => return rejection.into_response(),
    };

    let driver = ConnectionDriver::new(user.summary(), state.events.clone(), state.channels.clone());
    upgrade.on_upgrade(move |socket| run_connection(socket, driver))
}

async fn run_connection(socket: WebSocket, mut driver: ConnectionDriver) {
    let (mut sender, mut receiver) = socket.split();
    let name = driver.context().user.name.clone();
    let connection_id = driver.context().connection_id;
    tracing::info!("[Realtime] {} connected ({})", name, connection_id);

    'connection: loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    for event in driver.on_text(text.as_str()).await {
                        if send_event(&mut sender, &event).await.is_err() {
                            break 'connection;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break 'connection,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!("[Realtime] Socket error for {}: {}", name, e);
                    break 'connection;
                }
            },
            event = driver.next_relayed() => {
                if send_event(&mut sender, &event).await.is_err() {
                    break 'connection;
                }
            }
        }
    }

    tracing::info!("[Realtime] {} disconnected ({})", name, connection_id);
    driver.close().await;
}

async fn send_event(sender: &mut SplitSink<WebSocket, Message>, event: &ServerEvent) -> Result<(), axum::Error> {
    match event.to_json() {
        Ok(json) => sender.send(Message::Text(json.into())).await,
        Err(e) => {
            tracing::error!("[Realtime] Failed to encode {}: {}", event.name(), e);
            Ok(())
        }
    }
}
