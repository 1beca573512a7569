//! Error types for the `github_api` action.

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GithubApiError {
    /// Invalid parameters: unresolvable URL, unknown method, malformed body or headers.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Non-2xx response with no matching error handler.
    #[error("GitHub responded with {status}\n---\n{body}")]
    Status {
        method: String,
        url: String,
        /// Request headers as sent, with credentials redacted.
        headers: BTreeMap<String, String>,
        status: u16,
        body: String,
    },

    /// Connection, TLS or redirect failures.
    #[error("http transport error: {0}")]
    Transport(String),

    /// Raised by a caller-supplied success or error callback; passed through as-is.
    #[error(transparent)]
    Callback(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GithubApiError>;

impl From<reqwest::Error> for GithubApiError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(crate::redact::sanitize_reqwest_error(&value))
    }
}
