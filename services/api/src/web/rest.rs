//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::ApiError;
use crate::web::protocol::{
    ActionRequest, ActionResponse, CreateSessionResponse, RoundSummary, ScoreResponse,
    ServerMessage,
};
use crate::web::state::AppState;
use crate::web::turn::run_turn;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_session_handler,
        action_handler,
        score_handler,
    ),
    components(
        schemas(
            CreateSessionResponse,
            ActionRequest,
            ActionResponse,
            ServerMessage,
            ScoreResponse,
            RoundSummary
        )
    ),
    tags(
        (name = "Letter Jumble API", description = "API endpoints for the letter jumble word game.")
    )
)]
pub struct ApiDoc;

/// Maps an `ApiError` onto the `(StatusCode, String)` error shape the handlers return.
fn reject(err: ApiError) -> (StatusCode, String) {
    let status = err.status_code();
    if status.is_server_error() {
        error!("Request failed: {:?}", err);
    } else {
        warn!("Request rejected: {}", err);
    }
    (status, err.to_string())
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Create a new game session.
///
/// The session starts uninitialized; send a `start` action to hear the rules.
#[utoipa::path(
    post,
    path = "/sessions",
    responses(
        (status = 201, description = "Session created successfully", body = CreateSessionResponse)
    )
)]
pub async fn create_session_handler(
    State(app_state): State<Arc<AppState>>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session = app_state.engine.new_session();
    let session_id = app_state.sessions.insert(session).await;
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

/// Apply one player action to a session.
#[utoipa::path(
    post,
    path = "/sessions/{session_id}/actions",
    request_body = ActionRequest,
    responses(
        (status = 200, description = "What the game answered, in order", body = ActionResponse),
        (status = 404, description = "Unknown or closed session"),
        (status = 409, description = "The session was closed while the action was running")
    ),
    params(
        ("session_id" = Uuid, Path, description = "The session to act on.")
    )
)]
pub async fn action_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<ActionResponse>, (StatusCode, String)> {
    let outcomes = run_turn(
        &app_state.engine,
        &app_state.sessions,
        session_id,
        request.into(),
    )
    .await
    .map_err(reject)?;

    Ok(Json(ActionResponse::from_outcomes(outcomes)))
}

/// Report the running total and the rounds played so far.
#[utoipa::path(
    get,
    path = "/sessions/{session_id}/score",
    responses(
        (status = 200, description = "Current score", body = ScoreResponse),
        (status = 404, description = "Unknown or closed session")
    ),
    params(
        ("session_id" = Uuid, Path, description = "The session to report on.")
    )
)]
pub async fn score_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ScoreResponse>, (StatusCode, String)> {
    let slot = app_state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| reject(ApiError::SessionNotFound(session_id)))?;

    let session = slot.session.lock().await;
    Ok(Json(ScoreResponse {
        session_id,
        total: session.total_score(),
        rounds: session.rounds.iter().map(RoundSummary::from).collect(),
    }))
}
