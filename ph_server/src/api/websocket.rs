//! WebSocket handler for the game protocol.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws`
//! 2. Server resolves the peer's origin capability and sends `welcome`
//! 3. Server spawns a send task draining the connection's outbound queue;
//!    room actors and the hub both push into that queue
//! 4. The receive loop parses each text frame as a command and hands it to
//!    the hub
//! 5. On disconnect the player leaves their room as if they had sent
//!    `leaveRoom`
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:6969/ws');
//!
//! ws.onmessage = (event) => {
//!   const { type, payload } = JSON.parse(event.data);
//!   if (type === 'stateSnapshot') {
//!     render(payload);
//!   }
//! };
//!
//! ws.send(JSON.stringify({ type: 'createRoom', game: 'wildCard', displayName: 'alice' }));
//! ```

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use party_hub::{
    ActionOutcome, ClientCommand, ConnectionContext, ErrorKind, ServerMessage,
    auth::{Capability, required_capability},
    game::constants::OUTBOUND_QUEUE_SIZE,
};
use std::{net::SocketAddr, sync::atomic::Ordering};
use tokio::sync::mpsc;

use super::{AppState, rate_limiter::RateLimiter};
use crate::{logging, metrics};

/// Largest frame accepted from a client.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024;

/// Upgrade an HTTP connection to the game protocol.
///
/// Peers whose address is listed in `ADMIN_ORIGINS` start with admin
/// capability; everyone else starts as a player and may log in.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Response {
    ws.max_message_size(MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_socket(socket, peer, state))
}

/// Handle an established WebSocket connection.
///
/// # Arguments
///
/// - `socket`: The WebSocket connection
/// - `peer`: Remote address, used for the origin capability and logs
/// - `state`: Shared application state
async fn handle_socket(socket: WebSocket, peer: SocketAddr, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<ServerMessage>(OUTBOUND_QUEUE_SIZE);

    let origin_capability = state.origin_capability(peer.ip());
    let mut ctx = state.hub.connect(outbound_tx, origin_capability).await;
    let player_id = ctx.player_id;
    let player_label = player_id.to_string();

    let active = state.connections.fetch_add(1, Ordering::Relaxed) + 1;
    metrics::websocket_connections_total();
    metrics::websocket_connections_active(active);
    logging::log_connection_event("connected", &player_label, peer);

    let send_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(j) => j,
                Err(e) => {
                    error!("Failed to serialize server message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
            metrics::websocket_messages_sent();
        }
    });

    let mut limiter = RateLimiter::per_connection();

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                metrics::websocket_messages_received();

                if let Err(throttled) = limiter.check() {
                    metrics::rate_limit_hits_total("ws");
                    logging::log_rate_limited(&player_label, peer);
                    let reason = format!(
                        "Rate limit exceeded, retry in {}ms",
                        throttled.retry_after.as_millis()
                    );
                    reply_rejected(&ctx, reason, ErrorKind::ResourceExhausted).await;
                    continue;
                }

                match serde_json::from_str::<ClientCommand>(&text) {
                    Ok(command) => handle_command(&state, &mut ctx, command).await,
                    Err(e) => {
                        warn!("Failed to parse command from {}: {}", player_id, e);
                        reply_rejected(
                            &ctx,
                            "Invalid message format".to_string(),
                            ErrorKind::Validation,
                        )
                        .await;
                    }
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket closed: player={}", player_id);
                break;
            }
            Err(e) => {
                debug!("WebSocket error for {}: {}", player_id, e);
                break;
            }
            _ => {}
        }
    }

    // Cleanup - the same path as an explicit leave
    state.hub.handle_disconnect(&ctx).await;
    drop(ctx);
    send_task.abort();

    let active = state.connections.fetch_sub(1, Ordering::Relaxed).saturating_sub(1);
    metrics::websocket_connections_active(active);
    metrics::active_rooms(state.hub.rooms().room_count().await);
    logging::log_connection_event("disconnected", &player_label, peer);
}

/// Dispatch one parsed command and record what happened.
async fn handle_command(state: &AppState, ctx: &mut ConnectionContext, command: ClientCommand) {
    debug!("Command from {}: {}", ctx.player_id, command);

    let is_login = matches!(command, ClientCommand::Login { .. });
    let is_register = matches!(command, ClientCommand::Register { .. });
    let privileged = required_capability(&command) > Capability::Player;
    let audit = privileged.then(|| {
        (
            command.to_string(),
            command.room_code().map(str::to_string),
            ctx.capability.to_string(),
        )
    });

    let result = state.hub.handle_command(ctx, command).await;

    if is_login {
        metrics::login_attempts_total(result.is_ok());
    }
    if is_register {
        metrics::registrations_total(result.is_ok());
    }
    match &result {
        // Only the action that ended the game reports it.
        Ok(ActionOutcome::GameOver { .. }) => metrics::games_finished_total(),
        Ok(_) => {}
        Err(e) => metrics::actions_rejected_total(&e.kind().to_string()),
    }
    if let Some((command, room_code, capability)) = audit {
        logging::log_privileged_command(
            &ctx.player_id.to_string(),
            &capability,
            &command,
            room_code.as_deref(),
            result.is_ok(),
        );
    }
    metrics::active_rooms(state.hub.rooms().room_count().await);
}

async fn reply_rejected(ctx: &ConnectionContext, reason: String, kind: ErrorKind) {
    metrics::actions_rejected_total(&kind.to_string());
    if ctx
        .outbound
        .send(ServerMessage::ActionRejected { reason, kind })
        .await
        .is_err()
    {
        debug!("Connection {} closed before rejection", ctx.player_id);
    }
}
