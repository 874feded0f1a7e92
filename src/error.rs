//! Error taxonomy shared by the API clients and the CLI.
//!
//! Client wrappers only catch errors to enrich the message from the JSON
//! body; everything else bubbles to the caller. There are no automatic
//! retries anywhere, so every call is at-most-once.

use serde::Deserialize;
use thiserror::Error;

/// Errors surfaced by the tubedigest API clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No session exists where an authenticated call was attempted.
    #[error("not signed in")]
    Unauthenticated,

    /// The backend rejected the session token (HTTP 401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The user exceeded their processing quota (HTTP 403).
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The request was rejected as malformed (HTTP 400), or failed local
    /// validation before any network dispatch.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The backend failed (HTTP 5xx or any unclassified status).
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Transport-level failure, propagated un-wrapped from reqwest.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A status poll exhausted the caller's termination policy without the
    /// job reaching a terminal status.
    #[error("job did not reach a terminal status after {attempts} polls")]
    PollTimeout { attempts: u32 },

    /// A 2xx response carried a body we could not decode.
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Map a non-2xx, non-401 status to the taxonomy. 401 is handled at the
    /// request wrapper because it has the session-clearing side effect.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => ApiError::Validation(message),
            403 => ApiError::QuotaExceeded(message),
            404 => ApiError::NotFound(message),
            _ => ApiError::Server { status, message },
        }
    }
}

/// Error body envelope. The processing backend answers `{"detail": ..}`
/// (the canonical shape); the older BFF variant answered `{"error": ..}`,
/// which we still accept when decoding.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub detail: Option<String>,
    pub error: Option<String>,
}

impl ErrorEnvelope {
    pub fn message(self) -> Option<String> {
        self.detail.or(self.error)
    }
}
