//! Error types for ortho-whatsapp

use thiserror::Error;

/// ortho-whatsapp error type
#[derive(Error, Debug)]
pub enum WhatsAppError {
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    #[error("Cloud API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for WhatsAppError {
    fn from(err: reqwest::Error) -> Self {
        WhatsAppError::Http(err.to_string())
    }
}

impl From<WhatsAppError> for ortho_core::Error {
    fn from(err: WhatsAppError) -> Self {
        match err {
            WhatsAppError::InvalidPayload(msg) => ortho_core::Error::InvalidPayload(msg),
            other => ortho_core::Error::Messaging(other.to_string()),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, WhatsAppError>;
