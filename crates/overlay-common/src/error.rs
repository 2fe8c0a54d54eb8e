//! Error types for the wind overlay crates.

use thiserror::Error;

/// Result type alias using OverlayError.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Primary error type for overlay operations.
///
/// None of these are fatal to a session: a failure for one level or feature
/// category leaves every other level and category working.
#[derive(Debug, Error)]
pub enum OverlayError {
    // === Dataset Errors ===
    #[error("No wind dataset ({level}) for {date}: {reason}")]
    MissingDataset {
        level: String,
        date: String,
        reason: String,
    },

    #[error("Stale response for {level}: generation {token} superseded by {latest}")]
    StaleResponse { level: String, token: u64, latest: u64 },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    // === Input Errors ===
    #[error("Unknown wind level: {0}")]
    InvalidLevel(String),

    #[error("Invalid date key: {0}")]
    InvalidDate(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl OverlayError {
    /// Whether the session can carry on after this error by degrading locally.
    pub fn is_recoverable(&self) -> bool {
        match self {
            OverlayError::MissingDataset { .. }
            | OverlayError::StaleResponse { .. }
            | OverlayError::MalformedPayload(_)
            | OverlayError::Fetch(_) => true,

            OverlayError::InvalidLevel(_)
            | OverlayError::InvalidDate(_)
            | OverlayError::InvalidConfig(_) => false,
        }
    }

    /// True when the error means a newer request made this one irrelevant.
    pub fn is_stale(&self) -> bool {
        matches!(self, OverlayError::StaleResponse { .. })
    }
}

impl From<std::io::Error> for OverlayError {
    fn from(err: std::io::Error) -> Self {
        OverlayError::Fetch(err.to_string())
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(err: serde_json::Error) -> Self {
        OverlayError::MalformedPayload(format!("JSON error: {}", err))
    }
}
