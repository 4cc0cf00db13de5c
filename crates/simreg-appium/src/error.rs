//! Error types for the Appium client.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the automation server.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport error (connection refused, broken pipe, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server answered with a WebDriver error payload.
    #[error("WebDriver error: {error}: {message}")]
    WebDriver {
        /// W3C error code (e.g. `no such element`, `invalid session id`).
        error: String,
        /// Human-readable description from the server.
        message: String,
    },

    /// The server answered with a status code and no decodable payload.
    #[error("Unexpected HTTP status: {0}")]
    UnexpectedStatus(u16),

    /// The session creation response did not contain a session id.
    #[error("Invalid session response: {0}")]
    InvalidSession(String),
}

impl Error {
    /// True when the server reported that a located element does not exist.
    ///
    /// Callers treat this as a normal negative probe result, not a failure.
    #[must_use]
    pub fn is_no_such_element(&self) -> bool {
        matches!(self, Self::WebDriver { error, .. } if error == "no such element")
    }

    /// True when the session itself is gone (terminated or never created).
    #[must_use]
    pub fn is_session_lost(&self) -> bool {
        matches!(
            self,
            Self::WebDriver { error, .. }
                if error == "invalid session id" || error == "session not created"
        )
    }
}
