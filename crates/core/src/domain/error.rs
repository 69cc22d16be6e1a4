// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Configuration key for {key} was not found in configuration file({path}) in '{section}' section")]
    MissingConfigKey {
        section: String,
        key: String,
        path: String,
    },

    #[error("{key} = '{value}' is not of correct length in section: '{section}' of your configuration file: '{path}'")]
    InvalidConfigValue {
        section: String,
        key: String,
        value: String,
        path: String,
    },

    #[error("api_url = '{value}' is not a valid http(s) URL in section: '{section}' of your configuration file: '{path}'")]
    InvalidApiUrl {
        value: String,
        section: String,
        path: String,
    },

    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),

    #[error("{}", .0.join("\n"))]
    ConflictingOptions(Vec<String>),

    #[error("{}", .0.join("\n"))]
    IncompleteOptions(Vec<String>),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
