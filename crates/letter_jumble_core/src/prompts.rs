//! crates/letter_jumble_core/src/prompts.rs
//!
//! The sentences the engine hands to the front-end inside `Outcome::Prompt`
//! and `Outcome::Error`. Rendering (speech, SSML, cards) is the front-end's job.

pub const GAME_OBJECTIVE: &str = "Rearrange the letters to find the hidden word.";
pub const PRE_LETTER_ANNOUNCE: &str = "The letters are";
pub const TRY_NEW: &str = "Do you want to try a new word?";
pub const INVALID_NUMBER: &str = "Sorry, I didn't hear a valid number.";
pub const ERROR: &str = "Sorry, something went wrong!";
pub const TRY_AGAIN: &str = "Sorry, I couldn't reach the dictionary. Please try again.";
pub const INCORRECT: &str = "Sorry, that was incorrect.";
pub const KEEP_GUESSING: &str = "Okay, keep guessing.";
pub const SESSION_ENDED: &str = "This game has ended. Start a new one to keep playing.";
pub const GOODBYE: &str = "Thanks for playing!";

pub fn valid_number_warning(min: u8, max: u8) -> String {
    format!("You may only pick a number between {min} and {max}")
}

pub fn choose_level(min: u8, max: u8) -> String {
    format!("Pick a difficulty level between {min} and {max}.")
}

pub fn difficulty_level(level: impl std::fmt::Display) -> String {
    format!("Difficulty level set at {level}.")
}

pub fn success(points: u32) -> String {
    format!("Nice, you scored {points} points!")
}

pub fn failure(word: &str) -> String {
    format!("Sorry, that was incorrect. The word is {word}.")
}

pub fn not_a_word(guess: &str) -> String {
    format!("Those are the right letters, but {guess} isn't in my dictionary.")
}

pub fn skipped(word: &str) -> String {
    format!("The word was {word}.")
}

pub fn word_definition(word: &str, definition: Option<&str>) -> String {
    match definition {
        Some(text) => format!("{word}: {text}"),
        None => format!("See app for more information about {word}."),
    }
}

pub fn score_report(total: u32) -> String {
    format!("Your score is {total} points.")
}

pub fn help(min: u8, max: u8) -> String {
    format!(
        "{GAME_OBJECTIVE} Length of words can be controlled, say set level followed by a number between {min} and {max}. To answer, say the word is followed by your guess."
    )
}
