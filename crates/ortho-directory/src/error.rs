//! Error types for ortho-directory

use thiserror::Error;

/// ortho-directory error type
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Directory API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        DirectoryError::Http(err.to_string())
    }
}

impl From<DirectoryError> for ortho_core::Error {
    fn from(err: DirectoryError) -> Self {
        ortho_core::Error::Directory(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, DirectoryError>;
