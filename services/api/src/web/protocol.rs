//! services/api/src/web/protocol.rs
//!
//! Defines the JSON message protocol between the browser client and the API server,
//! shared by the WebSocket and the REST endpoints.

use letter_jumble_core::{Action, Outcome, Resolution, Round};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// The handshake a WebSocket client sends before any action.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Attaches to an existing session, or creates a new one when no id is given.
    /// This must be the first message sent on the connection.
    Init {
        #[serde(default)]
        session_id: Option<Uuid>,
    },
}

/// One player action, e.g. `{"type":"guess","text":"lemon"}`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionRequest {
    Start,
    /// The raw level utterance; it is validated by the game.
    SetLevel { level: String },
    /// A free-form utterance that may contain several candidate words.
    Guess { text: String },
    Repeat,
    Skip,
    Score,
    Stop,
    Confirm,
    Decline,
    Help,
}

impl From<ActionRequest> for Action {
    fn from(request: ActionRequest) -> Self {
        match request {
            ActionRequest::Start => Action::Start,
            ActionRequest::SetLevel { level } => Action::SetLevel(level),
            ActionRequest::Guess { text } => Action::Guess(text),
            ActionRequest::Repeat => Action::Repeat,
            ActionRequest::Skip => Action::Skip,
            ActionRequest::Score => Action::Score,
            ActionRequest::Stop => Action::Stop,
            ActionRequest::Confirm => Action::Confirm,
            ActionRequest::Decline => Action::Decline,
            ActionRequest::Help => Action::Help,
        }
    }
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured messages the server can send to the client.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms successful session initialization over the WebSocket.
    SessionInitialized { session_id: Uuid },

    /// A sentence to show (or speak) to the player.
    Prompt { text: String },

    /// A new scrambled word. Each entry in `letters` is a single character.
    RoundPresented { letters: Vec<String>, ordinal: usize },

    GuessResult {
        correct: bool,
        score: u32,
        bonus: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        word: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        definition: Option<String>,
        /// `not_a_word` when the letters fit but the dictionary rejected the guess.
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    ScoreReport { total: u32 },

    /// The game is over; the session has been closed.
    Ended,

    /// Reports an error. `kind` is a game error (`invalid_level`, `word_source_unavailable`,
    /// `session_ended`, `fatal`) or a server one (`bad_request`, `session_not_found`,
    /// `internal`, `transport`).
    Error { kind: String, message: String },
}

impl ServerMessage {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Error {
            kind: "bad_request".to_string(),
            message: message.into(),
        }
    }
}

impl From<Outcome> for ServerMessage {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Prompt(text) => Self::Prompt { text },
            Outcome::RoundPresented { letters, ordinal } => Self::RoundPresented {
                letters: letters.into_iter().map(String::from).collect(),
                ordinal,
            },
            Outcome::GuessResult {
                correct,
                score,
                bonus,
                word,
                definition,
                reason,
            } => Self::GuessResult {
                correct,
                score,
                bonus,
                word,
                definition,
                reason: reason.map(|kind| kind.as_str().to_string()),
            },
            Outcome::ScoreReport { total } => Self::ScoreReport { total },
            Outcome::Ended => Self::Ended,
            Outcome::Error { kind, message } => Self::Error {
                kind: kind.as_str().to_string(),
                message,
            },
        }
    }
}

//=========================================================================================
// REST Payloads
//=========================================================================================

/// The response payload sent after successfully creating a session.
#[derive(Serialize, Debug, ToSchema)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

/// Everything the game said in answer to one action.
#[derive(Serialize, Debug, ToSchema)]
pub struct ActionResponse {
    pub outcomes: Vec<ServerMessage>,
}

impl ActionResponse {
    pub fn from_outcomes(outcomes: Vec<Outcome>) -> Self {
        Self {
            outcomes: outcomes.into_iter().map(ServerMessage::from).collect(),
        }
    }
}

/// One played round as reported by the score endpoint.
#[derive(Serialize, Debug, PartialEq, Eq, ToSchema)]
pub struct RoundSummary {
    pub ordinal: usize,
    pub level: u8,
    /// Withheld while the round is still being played.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    pub points: u32,
    /// `solved`, `missed` or `skipped`; absent while the round is open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

impl From<&Round> for RoundSummary {
    fn from(round: &Round) -> Self {
        let resolution = round.resolution().map(|r| {
            match r {
                Resolution::Solved => "solved",
                Resolution::Missed => "missed",
                Resolution::Skipped => "skipped",
            }
            .to_string()
        });
        Self {
            ordinal: round.ordinal,
            level: round.level.value(),
            word: round.is_resolved().then(|| round.target_word().to_string()),
            points: round.points(),
            resolution,
        }
    }
}

/// The running total and round history of a session, newest round first.
#[derive(Serialize, Debug, ToSchema)]
pub struct ScoreResponse {
    pub session_id: Uuid,
    pub total: u32,
    pub rounds: Vec<RoundSummary>,
}
