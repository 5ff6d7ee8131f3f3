//! crates/letter_jumble_core/src/ports.rs
//!
//! Defines the service contracts (traits) the game engine consumes.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to stay independent of any particular dictionary service or clock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::Level;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, files).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The answer to "is this a real word?".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordLookup {
    pub exists: bool,
    pub definition: Option<String>,
}

impl WordLookup {
    pub fn found(definition: Option<String>) -> Self {
        Self {
            exists: true,
            definition,
        }
    }

    pub fn missing() -> Self {
        Self::default()
    }
}

#[async_trait]
pub trait WordSource: Send + Sync {
    /// Returns candidate dictionary words for a level. May contain duplicates or
    /// punctuation-bearing entries; the word queue filters them.
    async fn fetch_candidates(&self, level: Level) -> PortResult<Vec<String>>;

    /// Confirms a word exists and supplies a short definition when one is known.
    async fn verify(&self, word: &str) -> PortResult<WordLookup>;

    /// Fetches a definition for a word already known to exist.
    async fn define(&self, word: &str) -> PortResult<Option<String>> {
        Ok(self.verify(word).await?.definition)
    }
}

/// Source of "now" for round presentation and guess timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
