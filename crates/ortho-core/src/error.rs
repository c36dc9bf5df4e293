//! Error types for ortho-core

use thiserror::Error;

/// Main error type for ortho-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("WhatsApp API error: {0}")]
    Messaging(String),

    #[error("Patient directory error: {0}")]
    Directory(String),

    #[error("AI service error: {0}")]
    Ai(String),

    #[error("Meeting service error: {0}")]
    Meeting(String),

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    #[error("Session store error: {0}")]
    Session(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for ortho-core
pub type Result<T> = std::result::Result<T, Error>;
