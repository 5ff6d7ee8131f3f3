//! services/api/src/web/turn.rs
//!
//! Runs one player action against a stored session. Shared by the REST and
//! WebSocket transports.

use crate::error::ApiError;
use crate::web::state::SessionStore;
use letter_jumble_core::{Action, GameEngine, GameState, Outcome};
use tracing::{debug, info};
use uuid::Uuid;

/// Applies `action` to the session `session_id` and returns what the game said.
///
/// Turns for the same session run one at a time. The transition works on a copy
/// of the session which is only committed if the session was not closed while
/// the turn was waiting on the word source. A session that reaches `Ended` is
/// removed from the store.
pub async fn run_turn(
    engine: &GameEngine,
    sessions: &SessionStore,
    session_id: Uuid,
    action: Action,
) -> Result<Vec<Outcome>, ApiError> {
    let slot = sessions
        .get(session_id)
        .await
        .ok_or(ApiError::SessionNotFound(session_id))?;

    let mut session = slot.session.lock().await;
    if slot.cancellation_token.is_cancelled() {
        return Err(ApiError::SessionClosed(session_id));
    }
    debug!("Session {}: {:?}", session_id, action);

    let mut working = session.clone();
    let outcomes = tokio::select! {
        biased;
        _ = slot.cancellation_token.cancelled() => {
            info!("Session {} closed mid-turn; discarding the result.", session_id);
            return Err(ApiError::SessionClosed(session_id));
        }
        outcomes = engine.transition(&mut working, action) => outcomes,
    };

    let ended = working.state == GameState::Ended;
    *session = working;
    drop(session);

    if ended {
        sessions.close(session_id).await;
    }
    Ok(outcomes)
}
