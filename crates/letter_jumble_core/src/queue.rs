//! crates/letter_jumble_core/src/queue.rs
//!
//! Word queue management: loading candidate words for a level, keeping a
//! randomized pool of unused words per session, and drawing the next round.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

use crate::domain::{Level, Round, Session};
use crate::error::GameError;
use crate::ports::WordSource;

/// How many times a scramble is retried when it comes out in the original order.
const MAX_SCRAMBLE_ATTEMPTS: usize = 8;

/// True for words made only of letters (no spaces, hyphens, apostrophes, digits).
fn is_playable(word: &str) -> bool {
    !word.is_empty() && word.chars().all(char::is_alphabetic)
}

/// Fetches and cleans the candidate set for a level.
///
/// Punctuation-bearing entries are dropped and duplicates removed
/// (case-sensitively, keeping the first occurrence).
pub async fn load_candidates(
    source: &dyn WordSource,
    level: Level,
) -> Result<Vec<String>, GameError> {
    let fetched = source.fetch_candidates(level).await?;
    let fetched_count = fetched.len();

    let mut seen = HashSet::new();
    let candidates: Vec<String> = fetched
        .into_iter()
        .filter(|word| is_playable(word))
        .filter(|word| seen.insert(word.clone()))
        .collect();

    debug!(
        "Loaded {} usable candidates out of {} for level {}",
        candidates.len(),
        fetched_count,
        level
    );

    if candidates.is_empty() {
        return Err(GameError::EmptyCandidateSet(level));
    }
    Ok(candidates)
}

/// Builds a fresh, shuffled pool for `level`, leaving out words this session
/// has already presented at that level. Does not touch the session.
pub fn prepare_pool<R: Rng + ?Sized>(
    session: &Session,
    level: Level,
    candidates: Vec<String>,
    rng: &mut R,
) -> Result<VecDeque<String>, GameError> {
    let mut pool: Vec<String> = candidates
        .into_iter()
        .filter(|word| !session.was_presented(level, word))
        .collect();

    if pool.is_empty() {
        return Err(GameError::EmptyCandidateSet(level));
    }
    pool.shuffle(rng);
    Ok(pool.into())
}

/// Returns a random permutation of the word's letters.
///
/// Best-effort avoids handing back the original order when the word has more
/// than one distinct letter.
pub fn scramble<R: Rng + ?Sized>(word: &str, rng: &mut R) -> Vec<char> {
    let original: Vec<char> = word.chars().collect();
    let mut letters = original.clone();

    let distinct: HashSet<&char> = original.iter().collect();
    if distinct.len() < 2 {
        return letters;
    }

    for _ in 0..MAX_SCRAMBLE_ATTEMPTS {
        letters.shuffle(rng);
        if letters != original {
            break;
        }
    }
    letters
}

/// Pops the next word from the session's pool and makes it the active round.
pub fn next_round<'a, R: Rng + ?Sized>(
    session: &'a mut Session,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<&'a Round, GameError> {
    let word = session
        .remaining_words
        .pop_front()
        .ok_or(GameError::QueueExhausted)?;

    let letters = scramble(&word, rng);
    let ordinal = session.rounds.len() + 1;
    let round = Round::new(ordinal, session.level, word, letters, now);
    session.rounds.push_front(round);

    session.rounds.front().ok_or(GameError::NoActiveRound)
}
