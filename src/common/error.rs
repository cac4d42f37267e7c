//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {name}")]
    MissingVar { name: &'static str },

    #[error("Environment variable {name} is set but empty")]
    EmptyVar { name: &'static str },
}

/// Watch store / persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type alias for watch store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
