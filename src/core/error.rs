//! Error types for the application

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Failed to load reference data '{file}': {reason}")]
    DataLoad { file: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;
