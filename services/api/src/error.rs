//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.

use crate::config::ConfigError;
use axum::http::StatusCode;
use letter_jumble_core::PortError;
use uuid::Uuid;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the HTTP client used by the word source adapters.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents an error related to the WebSocket connection.
    #[error("WebSocket Error: {0}")]
    Websocket(#[from] axum::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested game session does not exist (or has been removed).
    #[error("Session {0} not found")]
    SessionNotFound(Uuid),

    /// The session ended or was abandoned while the action was in flight.
    #[error("Session {0} was closed before the action completed")]
    SessionClosed(Uuid),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    /// The HTTP status a REST handler should answer with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::SessionClosed(_) => StatusCode::CONFLICT,
            Self::Port(_) | Self::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `kind` reported to WebSocket clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SessionNotFound(_) => "session_not_found",
            Self::SessionClosed(_) => "session_closed",
            Self::Port(_) | Self::Http(_) => "word_source_unavailable",
            Self::Config(_) => "config",
            Self::Websocket(_) | Self::Io(_) => "transport",
            Self::Internal(_) => "internal",
        }
    }
}
