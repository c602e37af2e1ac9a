use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for the rules engine and its surfaces.
///
/// Bad *content* (malformed XML, invalid enum values, unmapped fields) is never
/// reported through this type; validators return structured findings instead.
/// These variants cover bad requests and genuinely unexpected failures.
#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Unknown enum type: {0}")]
    UnknownEnumType(String),

    #[error("Unknown datatype: {0}")]
    UnknownDatatype(String),

    /// Request body could not be read; `status` is the HTTP status to answer with.
    #[error("Request body rejected: {message}")]
    Payload { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File discovery error: {path} - {reason}")]
    FileDiscovery { path: PathBuf, reason: String },

    #[error("Concurrent operation error: {details}")]
    Concurrency { details: String },
}

impl RulesError {
    /// Errors caused by the caller's request rather than by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RulesError::UnknownAction(_)
                | RulesError::InvalidRequest(_)
                | RulesError::MissingParameter(_)
                | RulesError::UnknownEnumType(_)
                | RulesError::UnknownDatatype(_)
                | RulesError::Payload { .. }
        )
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, RulesError>;
