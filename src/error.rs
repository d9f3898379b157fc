// File: ./src/error.rs
//! Error taxonomy shared by every stage of the page pipeline.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RaspError>;

#[derive(Debug, Error)]
pub enum RaspError {
    /// The page does not have the expected schedule-table shape.
    #[error("unexpected page structure: {0}")]
    Structure(String),

    /// No key override was given and the key endpoint could not provide one.
    #[error("could not resolve cipher key: {0}")]
    KeyResolution(String),

    /// A ciphertext attribute could not be decoded.
    #[error("could not decode ciphertext: {0}")]
    Decode(String),

    /// A date or time token was not recognised.
    #[error("could not parse '{token}': {reason}")]
    Parse { token: String, reason: String },

    /// Surfaced verbatim from the HTTP layer.
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// A page worker panicked or was cancelled.
    #[error("page worker failed: {0}")]
    Worker(String),
}

impl RaspError {
    pub(crate) fn parse(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            token: token.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
