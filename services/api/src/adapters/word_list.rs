//! services/api/src/adapters/word_list.rs
//!
//! This module contains a dictionary adapter backed by a local word list.
//! It implements the `WordSource` port from the `core` crate.
//!
//! File format: one entry per line, either `word` or `word<TAB>definition`.
//! Blank lines and lines starting with `#` are ignored.

use async_trait::async_trait;
use letter_jumble_core::{Level, PortResult, WordLookup, WordSource};
use rand::seq::IndexedRandom;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use tracing::info;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `WordSource` port using an in-memory word list.
#[derive(Clone, Debug)]
pub struct WordListAdapter {
    by_length: HashMap<usize, Vec<String>>,
    definitions: HashMap<String, Option<String>>,
    candidate_limit: usize,
}

impl WordListAdapter {
    /// Loads a word list file.
    pub fn from_file<P: AsRef<Path>>(path: P, candidate_limit: usize) -> io::Result<Self> {
        let content = fs::read_to_string(&path)?;
        let adapter = Self::from_entries(&content, candidate_limit);
        info!(
            "Loaded {} words from {}",
            adapter.definitions.len(),
            path.as_ref().display()
        );
        Ok(adapter)
    }

    /// Parses word list text. Later duplicates of a word are ignored.
    pub fn from_entries(content: &str, candidate_limit: usize) -> Self {
        let mut by_length: HashMap<usize, Vec<String>> = HashMap::new();
        let mut definitions = HashMap::new();

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let (word, definition) = match trimmed.split_once('\t') {
                Some((word, definition)) => {
                    let definition = definition.trim();
                    (word.trim(), (!definition.is_empty()).then(|| definition.to_string()))
                }
                None => (trimmed, None),
            };

            let key = word.to_lowercase();
            if definitions.contains_key(&key) {
                continue;
            }
            definitions.insert(key, definition);
            by_length
                .entry(word.chars().count())
                .or_default()
                .push(word.to_string());
        }

        Self {
            by_length,
            definitions,
            candidate_limit,
        }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

//=========================================================================================
// `WordSource` Trait Implementation
//=========================================================================================

#[async_trait]
impl WordSource for WordListAdapter {
    /// Returns a random sample of words with exactly the level's length.
    async fn fetch_candidates(&self, level: Level) -> PortResult<Vec<String>> {
        let Some(words) = self.by_length.get(&level.word_length()) else {
            return Ok(Vec::new());
        };
        let sample = words
            .choose_multiple(&mut rand::rng(), self.candidate_limit)
            .cloned()
            .collect();
        Ok(sample)
    }

    async fn verify(&self, word: &str) -> PortResult<WordLookup> {
        Ok(match self.definitions.get(&word.to_lowercase()) {
            Some(definition) => WordLookup::found(definition.clone()),
            None => WordLookup::missing(),
        })
    }
}
