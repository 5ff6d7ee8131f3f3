//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! Frames are read here and handed to a turn worker, so the connection can
//! notice a disconnect (and cancel the session) while a turn is still running.

use crate::error::ApiError;
use crate::web::{
    protocol::{ActionRequest, ClientMessage, ServerMessage},
    state::AppState,
    turn::run_turn,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use letter_jumble_core::{Action, Outcome};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};
use uuid::Uuid;

type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// Actions queued behind the one currently running.
const ACTION_BUFFER: usize = 16;

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New WebSocket connection established.");

    // The sender is wrapped in an Arc<Mutex<>> so the turn worker can write to it.
    let (sender, mut receiver) = socket.split();
    let ws_sender: WsSender = Arc::new(Mutex::new(sender));

    // --- 1. Initialization Phase ---
    let session_id = match receiver.next().await {
        Some(Ok(Message::Text(init_json))) => {
            match serde_json::from_str::<ClientMessage>(&init_json) {
                Ok(ClientMessage::Init {
                    session_id: Some(session_id),
                }) => {
                    if app_state.sessions.get(session_id).await.is_none() {
                        warn!("Init for unknown session {}", session_id);
                        let missing = ApiError::SessionNotFound(session_id);
                        let message = ServerMessage::Error {
                            kind: missing.kind().to_string(),
                            message: missing.to_string(),
                        };
                        let _ = send_message(&ws_sender, &message).await;
                        return;
                    }
                    session_id
                }
                Ok(ClientMessage::Init { session_id: None }) => {
                    app_state
                        .sessions
                        .insert(app_state.engine.new_session())
                        .await
                }
                Err(e) => {
                    error!("First message was not a valid Init message: {}", e);
                    let message = ServerMessage::bad_request("The first message must be an init message.");
                    let _ = send_message(&ws_sender, &message).await;
                    return;
                }
            }
        }
        _ => {
            error!("Client disconnected before sending Init message.");
            return;
        }
    };

    info!("Initializing session with ID: {}", session_id);
    if let Err(e) = send_message(&ws_sender, &ServerMessage::SessionInitialized { session_id }).await {
        error!("Failed to send session initialized message: {}", e);
        app_state.sessions.close(session_id).await;
        return;
    }

    // --- 2. Turn Worker ---
    let (action_tx, action_rx) = mpsc::channel::<Action>(ACTION_BUFFER);
    let worker = {
        let app_state = app_state.clone();
        let ws_sender = ws_sender.clone();
        tokio::spawn(async move { turn_worker(app_state, session_id, action_rx, ws_sender).await })
    };

    // --- 3. Main Message Loop ---
    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ActionRequest>(&text) {
                Ok(request) => {
                    if action_tx.send(request.into()).await.is_err() {
                        // The worker has finished (the game ended).
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to deserialize client message: {}", e);
                    let message = ServerMessage::bad_request(format!("Unrecognized action: {}", e));
                    if send_message(&ws_sender, &message).await.is_err() {
                        break;
                    }
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client sent close message.");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    // --- 4. Cleanup ---
    // Closing the session cancels a turn that is still waiting on the word source.
    drop(action_tx);
    app_state.sessions.close(session_id).await;
    if let Err(e) = worker.await {
        error!("Turn worker for session {} failed: {:?}", session_id, e);
    }
    info!("WebSocket connection closed.");
}

/// Runs queued actions one after another and streams the outcomes back.
async fn turn_worker(
    app_state: Arc<AppState>,
    session_id: Uuid,
    mut actions: mpsc::Receiver<Action>,
    ws_sender: WsSender,
) {
    while let Some(action) = actions.recv().await {
        match run_turn(&app_state.engine, &app_state.sessions, session_id, action).await {
            Ok(outcomes) => {
                let ended = outcomes.contains(&Outcome::Ended);
                for outcome in outcomes {
                    if let Err(e) = send_message(&ws_sender, &ServerMessage::from(outcome)).await {
                        error!("Failed to send outcome: {}", e);
                        return;
                    }
                }
                if ended {
                    let _ = ws_sender.lock().await.send(Message::Close(None)).await;
                    return;
                }
            }
            Err(ApiError::SessionClosed(_)) => return,
            Err(e) => {
                error!("Turn failed for session {}: {}", session_id, e);
                let message = ServerMessage::Error {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                };
                let _ = send_message(&ws_sender, &message).await;
                return;
            }
        }
    }
}

async fn send_message(ws_sender: &WsSender, message: &ServerMessage) -> Result<(), ApiError> {
    let json = serde_json::to_string(message).map_err(|e| ApiError::Internal(e.to_string()))?;
    ws_sender
        .lock()
        .await
        .send(Message::Text(json.into()))
        .await?;
    Ok(())
}
