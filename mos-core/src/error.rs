use thiserror::Error;

/// Failures surfaced by the dashboard rules.
///
/// Nothing here is fatal to the page: callers turn every variant into either
/// a notification or a logged no-op.
#[derive(Debug, Error)]
pub enum Error {
    #[error("provided ticker is empty")]
    EmptyTicker,
    #[error("invalid character {ch:?} in ticker {input:?}")]
    InvalidTicker { input: String, ch: char },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("{status} {status_text}: {message}")]
    Http {
        status: u16,
        status_text: String,
        message: String,
    },
    #[error("legacy search error: {0}")]
    Legacy(String),
}

pub type Result<T> = std::result::Result<T, Error>;
