// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rate Limit Reached, will reset in {reset} seconds")]
    RateLimited { reset: String },

    #[error("Request Error: {message}")]
    Http { status: u16, message: String },

    #[error("Unexpected Content Type Received in Response: {0}")]
    UnexpectedContentType(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: reqwest::Error conversion is handled in the infra-http crate
// by converting to AppError::Transport(String)
