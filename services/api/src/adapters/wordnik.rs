//! services/api/src/adapters/wordnik.rs
//!
//! This module contains the adapter for the Wordnik dictionary API (v4).
//! It implements the `WordSource` port from the `core` crate.

use async_trait::async_trait;
use letter_jumble_core::{Level, PortError, PortResult, WordLookup, WordSource};
use regex::Regex;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFINITION_LIMIT: &str = "3";

#[derive(Debug, Deserialize)]
struct RandomWord {
    word: String,
}

#[derive(Debug, Deserialize)]
struct Definition {
    #[serde(default)]
    text: Option<String>,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `WordSource` port using the Wordnik HTTP API.
#[derive(Clone)]
pub struct WordnikAdapter {
    client: Client,
    base_url: String,
    api_key: String,
    candidate_limit: usize,
}

impl WordnikAdapter {
    /// Creates a new `WordnikAdapter` with a client that times out slow requests.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        candidate_limit: usize,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            candidate_limit,
        })
    }

    /// Builds `{base_url}/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> PortResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PortError::Unexpected(format!("Invalid Wordnik base URL: {}", e)))?;
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                PortError::Unexpected(format!("Wordnik base URL {} cannot hold a path", self.base_url))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }
}

//=========================================================================================
// `WordSource` Trait Implementation
//=========================================================================================

#[async_trait]
impl WordSource for WordnikAdapter {
    async fn fetch_candidates(&self, level: Level) -> PortResult<Vec<String>> {
        let url = self.endpoint(&["words.json", "randomWords"])?;
        let length = level.word_length().to_string();
        let limit = self.candidate_limit.to_string();

        let response = self
            .client
            .get(url)
            .query(&[
                ("hasDictionaryDef", "true"),
                ("minLength", length.as_str()),
                ("maxLength", length.as_str()),
                ("limit", limit.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        if !status.is_success() {
            warn!("Wordnik randomWords answered {}", status);
            return Err(status_error("randomWords", status));
        }

        let words: Vec<RandomWord> = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to parse Wordnik response: {}", e)))?;
        debug!("Wordnik returned {} candidates for level {}", words.len(), level);

        Ok(words.into_iter().map(|w| w.word).collect())
    }

    async fn verify(&self, word: &str) -> PortResult<WordLookup> {
        let url = self.endpoint(&["word.json", word, "definitions"])?;

        let response = self
            .client
            .get(url)
            .query(&[("limit", DEFINITION_LIMIT), ("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(WordLookup::missing());
        }
        if !status.is_success() {
            warn!("Wordnik definitions for '{}' answered {}", word, status);
            return Err(status_error("definitions", status));
        }

        let definitions: Vec<Definition> = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to parse Wordnik response: {}", e)))?;

        Ok(lookup_from(definitions))
    }
}

/// Timeouts and connection failures are outages; anything else is unexpected.
fn request_failed(err: reqwest::Error) -> PortError {
    if err.is_timeout() || err.is_connect() {
        PortError::Unavailable(format!("Wordnik unreachable: {}", err))
    } else {
        PortError::Unexpected(format!("Wordnik request failed: {}", err))
    }
}

fn status_error(endpoint: &str, status: StatusCode) -> PortError {
    let message = format!("Wordnik {} error ({})", endpoint, status);
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        PortError::Unavailable(message)
    } else {
        PortError::Unexpected(message)
    }
}

/// A non-empty definition list means the word exists.
fn lookup_from(definitions: Vec<Definition>) -> WordLookup {
    if definitions.is_empty() {
        return WordLookup::missing();
    }
    let definition = definitions
        .into_iter()
        .filter_map(|d| d.text)
        .map(|text| strip_markup(&text))
        .find(|text| !text.is_empty());
    WordLookup::found(definition)
}

/// Wordnik definitions carry inline markup such as `<xref>`.
fn strip_markup(text: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex is valid"));
    tags.replace_all(text, "").trim().to_string()
}
