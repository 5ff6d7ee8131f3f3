//! crates/letter_jumble_core/src/domain.rs
//!
//! Defines the pure, core data structures for the game.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::fmt;
use uuid::Uuid;

use crate::error::{ErrorKind, GameError};

//=========================================================================================
// Levels and Game Configuration
//=========================================================================================

/// The configured word length for a session.
///
/// Only obtainable through [`GameConfig`], so every `Level` in circulation lies
/// inside the configured range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Level(u8);

impl Level {
    pub fn value(self) -> u8 {
        self.0
    }

    /// The number of letters in a word drawn for this level.
    pub fn word_length(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a level value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("'{0}' is not a number")]
    Malformed(String),
    #[error("level {value} is outside the supported range {min}..={max}")]
    OutOfRange { value: i64, min: u8, max: u8 },
    #[error("default level {default} is outside the range {min}..={max}")]
    InvalidRange { min: u8, max: u8, default: u8 },
}

/// The rules a `GameEngine` is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    min_level: u8,
    max_level: u8,
    default_level: u8,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_level: 3,
            max_level: 10,
            default_level: 5,
        }
    }
}

impl GameConfig {
    pub fn new(min_level: u8, max_level: u8, default_level: u8) -> Result<Self, LevelError> {
        if min_level == 0 || min_level > max_level || !(min_level..=max_level).contains(&default_level) {
            return Err(LevelError::InvalidRange {
                min: min_level,
                max: max_level,
                default: default_level,
            });
        }
        Ok(Self {
            min_level,
            max_level,
            default_level,
        })
    }

    pub fn min_level(&self) -> u8 {
        self.min_level
    }

    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    pub fn default_level(&self) -> Level {
        Level(self.default_level)
    }

    /// Builds a `Level` from a numeric value, checking the configured range.
    pub fn level(&self, value: u8) -> Result<Level, LevelError> {
        self.check_range(i64::from(value))
    }

    /// Parses a level slot value as spoken by the player, e.g. `"5"` or `" 7 "`.
    pub fn parse_level(&self, raw: &str) -> Result<Level, LevelError> {
        let trimmed = raw.trim();
        let value = trimmed
            .parse::<i64>()
            .map_err(|_| LevelError::Malformed(trimmed.to_string()))?;
        self.check_range(value)
    }

    fn check_range(&self, value: i64) -> Result<Level, LevelError> {
        if value < i64::from(self.min_level) || value > i64::from(self.max_level) {
            return Err(LevelError::OutOfRange {
                value,
                min: self.min_level,
                max: self.max_level,
            });
        }
        // The range check above guarantees the value fits in a u8.
        Ok(Level(value as u8))
    }
}

//=========================================================================================
// Rounds
//=========================================================================================

/// How a round was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// An accepted guess was scored.
    Solved,
    /// A letter-compatible guess failed dictionary verification.
    Missed,
    /// The player moved on without solving it.
    Skipped,
}

/// One presented scrambled word and its resolution.
#[derive(Debug, Clone)]
pub struct Round {
    pub id: Uuid,
    pub ordinal: usize,
    pub level: Level,
    target_word: String,
    scrambled_letters: Vec<char>,
    pub presented_at: DateTime<Utc>,
    first_correct_guess_at: Option<DateTime<Utc>>,
    score: u32,
    bonus: u32,
    guesses: Vec<String>,
    resolution: Option<Resolution>,
}

impl Round {
    pub fn new(
        ordinal: usize,
        level: Level,
        target_word: String,
        scrambled_letters: Vec<char>,
        presented_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            ordinal,
            level,
            target_word,
            scrambled_letters,
            presented_at,
            first_correct_guess_at: None,
            score: 0,
            bonus: 0,
            guesses: Vec::new(),
            resolution: None,
        }
    }

    pub fn target_word(&self) -> &str {
        &self.target_word
    }

    pub fn scrambled_letters(&self) -> &[char] {
        &self.scrambled_letters
    }

    pub fn first_correct_guess_at(&self) -> Option<DateTime<Utc>> {
        self.first_correct_guess_at
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn bonus(&self) -> u32 {
        self.bonus
    }

    /// Score plus bonus; zero for any round that was not solved.
    pub fn points(&self) -> u32 {
        self.score + self.bonus
    }

    pub fn guesses(&self) -> &[String] {
        &self.guesses
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    pub fn record_guess(&mut self, guess: impl Into<String>) {
        self.guesses.push(guess.into());
    }

    /// Writes the score and bonus for an accepted guess. Write-once.
    pub fn award(
        &mut self,
        guessed_at: DateTime<Utc>,
        score: u32,
        bonus: u32,
    ) -> Result<(), GameError> {
        if self.resolution.is_some() {
            return Err(GameError::RoundAlreadyResolved(self.id));
        }
        self.first_correct_guess_at = Some(guessed_at);
        self.score = score;
        self.bonus = bonus;
        self.resolution = Some(Resolution::Solved);
        Ok(())
    }

    /// Closes the round without points.
    pub fn close(&mut self, resolution: Resolution) -> Result<(), GameError> {
        if self.resolution.is_some() {
            return Err(GameError::RoundAlreadyResolved(self.id));
        }
        self.resolution = Some(resolution);
        Ok(())
    }
}

//=========================================================================================
// Sessions
//=========================================================================================

/// Where a session sits in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Uninitialized,
    LevelPending,
    Playing,
    RoundResolved,
    Ended,
}

/// All mutable state for one conversation, owned by the caller.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub level: Level,
    pub remaining_words: VecDeque<String>,
    /// Newest first; the head is the active round while `Playing`.
    pub rounds: VecDeque<Round>,
    pub started: bool,
    pub state: GameState,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(level: Level, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            remaining_words: VecDeque::new(),
            rounds: VecDeque::new(),
            started: false,
            state: GameState::Uninitialized,
            created_at,
        }
    }

    /// The most recently presented round, resolved or not.
    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.front()
    }

    /// The round awaiting a guess, if any.
    pub fn active_round(&self) -> Option<&Round> {
        match self.state {
            GameState::Playing => self.rounds.front().filter(|r| !r.is_resolved()),
            _ => None,
        }
    }

    pub fn active_round_mut(&mut self) -> Option<&mut Round> {
        match self.state {
            GameState::Playing => self.rounds.front_mut().filter(|r| !r.is_resolved()),
            _ => None,
        }
    }

    pub fn total_score(&self) -> u32 {
        self.rounds.iter().map(Round::points).sum()
    }

    /// True if `word` was already the target of a round drawn for `level`.
    pub fn was_presented(&self, level: Level, word: &str) -> bool {
        self.rounds
            .iter()
            .any(|r| r.level == level && r.target_word == word)
    }

    /// Drops all game data; used when the conversation ends.
    pub fn clear(&mut self) {
        self.remaining_words.clear();
        self.rounds.clear();
        self.started = false;
    }
}

//=========================================================================================
// Actions and Outcomes
//=========================================================================================

/// A discrete action extracted by the conversational front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Start,
    SetLevel(String),
    Guess(String),
    Repeat,
    Skip,
    Score,
    Stop,
    Confirm,
    Decline,
    Help,
}

/// Something the front-end should render back to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Prompt(String),
    RoundPresented {
        letters: Vec<char>,
        ordinal: usize,
    },
    GuessResult {
        correct: bool,
        score: u32,
        bonus: u32,
        /// The solved word, or the revealed target after a resolved miss.
        word: Option<String>,
        definition: Option<String>,
        /// Set to `NotAWord` when the letters matched but the dictionary did not.
        reason: Option<ErrorKind>,
    },
    ScoreReport {
        total: u32,
    },
    Ended,
    Error {
        kind: ErrorKind,
        message: String,
    },
}
