//! services/api/src/config.rs
//!
//! Defines the service's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use letter_jumble_core::{GameConfig, LevelError};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
    #[error("Invalid level range: {0}")]
    Levels(#[from] LevelError),
}

/// Which dictionary backs the game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WordSourceKind {
    /// A local word list file.
    WordList { path: PathBuf },
    /// The Wordnik HTTP API.
    Wordnik { api_key: String, base_url: String },
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub cors_origin: String,
    pub word_source: WordSourceKind,
    pub candidate_limit: usize,
    pub game: GameConfig,
    /// Sessions untouched for this long are closed by the sweeper.
    pub session_ttl: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address = parse_or(&lookup, "BIND_ADDRESS", "0.0.0.0:3000")?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- Word Source Settings ---
        let source_name = lookup("WORD_SOURCE").unwrap_or_else(|| "wordlist".to_string());
        let word_source = match source_name.to_lowercase().as_str() {
            "wordlist" => WordSourceKind::WordList {
                path: lookup("WORD_LIST_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./words.txt")),
            },
            "wordnik" => WordSourceKind::Wordnik {
                api_key: lookup("WORDNIK_API_KEY")
                    .ok_or_else(|| ConfigError::MissingVar("WORDNIK_API_KEY".to_string()))?,
                base_url: lookup("WORDNIK_BASE_URL")
                    .unwrap_or_else(|| "https://api.wordnik.com/v4".to_string()),
            },
            other => {
                return Err(ConfigError::InvalidValue(
                    "WORD_SOURCE".to_string(),
                    format!("'{}' is not one of 'wordlist' or 'wordnik'", other),
                ))
            }
        };

        let candidate_limit: usize = parse_or(&lookup, "CANDIDATE_LIMIT", "10")?;
        if candidate_limit == 0 {
            return Err(ConfigError::InvalidValue(
                "CANDIDATE_LIMIT".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let ttl_secs: u64 = parse_or(&lookup, "SESSION_TTL_SECS", "1800")?;
        if ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let session_ttl = Duration::from_secs(ttl_secs);

        // --- Game Rules ---
        let defaults = GameConfig::default();
        let min_level = parse_or(&lookup, "MIN_LEVEL", &defaults.min_level().to_string())?;
        let max_level = parse_or(&lookup, "MAX_LEVEL", &defaults.max_level().to_string())?;
        let default_level = parse_or(
            &lookup,
            "DEFAULT_LEVEL",
            &defaults.default_level().to_string(),
        )?;
        let game = GameConfig::new(min_level, max_level, default_level)?;

        Ok(Self {
            bind_address,
            log_level,
            cors_origin,
            word_source,
            candidate_limit,
            game,
            session_ttl,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}
