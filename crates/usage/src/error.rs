use thiserror::Error;

/// Failures inside usage reporting. These are logged at debug level and discarded.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("home directory is not known")]
    NoHome,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid report URL: {0}")]
    Url(#[from] url::ParseError),
}
