//! Error types for ortho-ai

use thiserror::Error;

/// ortho-ai error type
#[derive(Error, Debug)]
pub enum AiError {
    #[error("AI API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Empty completion response")]
    EmptyResponse,
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        AiError::Http(err.to_string())
    }
}

impl From<AiError> for ortho_core::Error {
    fn from(err: AiError) -> Self {
        ortho_core::Error::Ai(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AiError>;
