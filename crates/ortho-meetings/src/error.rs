//! Error types for ortho-meetings

use thiserror::Error;

/// ortho-meetings error type
#[derive(Error, Debug)]
pub enum MeetingError {
    #[error("OAuth token request failed: {0}")]
    Auth(String),

    #[error("Meeting API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Meeting response missing join link")]
    MissingJoinLink,
}

impl From<reqwest::Error> for MeetingError {
    fn from(err: reqwest::Error) -> Self {
        MeetingError::Http(err.to_string())
    }
}

impl From<MeetingError> for ortho_core::Error {
    fn from(err: MeetingError) -> Self {
        ortho_core::Error::Meeting(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, MeetingError>;
