//! Error types for the terminal

use thiserror::Error;

/// Terminal-wide error type
#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ArenaError {
    pub fn api(msg: impl Into<String>) -> Self {
        ArenaError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        ArenaError::Network(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        ArenaError::Auth(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        ArenaError::Parse(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ArenaError::NotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        ArenaError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ArenaError::Internal(msg.into())
    }
}

/// Result type alias for terminal operations
pub type ArenaResult<T> = Result<T, ArenaError>;
