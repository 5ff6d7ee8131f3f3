//! crates/letter_jumble_core/src/scoring.rs
//!
//! Base score and time-decay bonus for an accepted guess.

use chrono::{DateTime, Utc};

/// Points per letter for any accepted guess.
pub const POINTS_PER_LETTER: u32 = 10;

/// Answers at or under this many seconds earn the full bonus.
pub const FAST_ANSWER_SECS: i64 = 15;

/// Answers at or over this many seconds earn no bonus.
pub const SLOW_ANSWER_SECS: i64 = 30;

const FAST_BONUS_PER_LETTER: u32 = 5;
const SLOW_BONUS_PER_LETTER: u32 = 2;

fn letter_count(word: &str) -> u32 {
    u32::try_from(word.chars().count()).unwrap_or(u32::MAX)
}

pub fn base_score(word: &str) -> u32 {
    letter_count(word).saturating_mul(POINTS_PER_LETTER)
}

/// Seconds from presentation to guess, rounded to the nearest second.
pub fn elapsed_seconds(presented_at: DateTime<Utc>, guessed_at: DateTime<Utc>) -> i64 {
    let millis = (guessed_at - presented_at).num_milliseconds().max(0);
    (millis + 500) / 1000
}

pub fn bonus(word: &str, elapsed_secs: i64) -> u32 {
    let per_letter = if elapsed_secs <= FAST_ANSWER_SECS {
        FAST_BONUS_PER_LETTER
    } else if elapsed_secs < SLOW_ANSWER_SECS {
        SLOW_BONUS_PER_LETTER
    } else {
        0
    };
    letter_count(word).saturating_mul(per_letter)
}

/// `(score, bonus)` for a word guessed at `guessed_at` in a round shown at `presented_at`.
pub fn score_guess(
    word: &str,
    presented_at: DateTime<Utc>,
    guessed_at: DateTime<Utc>,
) -> (u32, u32) {
    let elapsed = elapsed_seconds(presented_at, guessed_at);
    (base_score(word), bonus(word, elapsed))
}
