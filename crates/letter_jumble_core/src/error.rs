//! crates/letter_jumble_core/src/error.rs
//!
//! Defines the error type for engine operations and the closed set of error
//! kinds reported back to the front-end.

use uuid::Uuid;

use crate::domain::{Level, LevelError};
use crate::ports::PortError;

/// The error kinds a front-end can be told about. Candidate exhaustion is
/// recovered inside the engine and only escapes as `Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidLevel,
    WordSourceUnavailable,
    /// Only ever reported as an incorrect guess result, never raised.
    NotAWord,
    SessionEnded,
    Fatal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidLevel => "invalid_level",
            Self::WordSourceUnavailable => "word_source_unavailable",
            Self::NotAWord => "not_a_word",
            Self::SessionEnded => "session_ended",
            Self::Fatal => "fatal",
        }
    }
}

/// Errors raised by the word queue and the state machine.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Invalid level: {0}")]
    InvalidLevel(#[from] LevelError),

    #[error("The word source returned no usable words for level {0}")]
    EmptyCandidateSet(Level),

    #[error("No words left in the queue")]
    QueueExhausted,

    #[error("Word source unavailable: {0}")]
    WordSourceUnavailable(#[from] PortError),

    #[error("Round {0} has already been resolved")]
    RoundAlreadyResolved(Uuid),

    #[error("No round is awaiting a guess")]
    NoActiveRound,

    #[error("The session has ended")]
    SessionEnded,
}

impl GameError {
    /// How this error is surfaced. Anything without a local recovery is `Fatal`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidLevel(_) => ErrorKind::InvalidLevel,
            Self::WordSourceUnavailable(_) => ErrorKind::WordSourceUnavailable,
            Self::SessionEnded => ErrorKind::SessionEnded,
            Self::EmptyCandidateSet(_)
            | Self::QueueExhausted
            | Self::RoundAlreadyResolved(_)
            | Self::NoActiveRound => ErrorKind::Fatal,
        }
    }
}
