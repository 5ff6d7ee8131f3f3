//! crates/letter_jumble_core/src/validator.rs
//!
//! Letter-compatibility checks between a player's guess and a round's target word.
//!
//! A guess is letter-compatible when it uses exactly the target's letters, in any
//! order. Whether it is also a real word is the word source's call, not ours.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

static WORD_REGEX: OnceLock<Regex> = OnceLock::new();

fn fold(text: &str) -> Vec<char> {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// True if `guess` is some anagram of `target`, ignoring case.
///
/// Multiset equality by destructive removal: each character of the guess,
/// scanned right to left, removes the first matching occurrence from a copy
/// of the target.
pub fn is_letter_compatible(guess: &str, target: &str) -> bool {
    let guess = fold(guess);
    let mut remaining = fold(target);

    if guess.len() != remaining.len() {
        return false;
    }

    for ch in guess.iter().rev() {
        match remaining.iter().position(|c| c == ch) {
            Some(index) => {
                remaining.remove(index);
            }
            None => return false,
        }
    }
    remaining.is_empty()
}

/// Case-folded equality with the target.
pub fn is_exact_match(guess: &str, target: &str) -> bool {
    fold(guess) == fold(target)
}

/// Splits a guess utterance into candidate words.
///
/// Keeps runs of alphabetic characters, dropping repeats (case-insensitively)
/// while preserving the order they were spoken in.
pub fn extract_guesses(utterance: &str) -> Vec<String> {
    let regex = WORD_REGEX
        .get_or_init(|| Regex::new(r"\p{Alphabetic}+").expect("word pattern is valid"));

    let mut seen = HashSet::new();
    regex
        .find_iter(utterance)
        .map(|m| m.as_str().to_string())
        .filter(|word| seen.insert(word.to_lowercase()))
        .collect()
}
