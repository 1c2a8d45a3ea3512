//! Error types for Axon.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! inference, knowledge, search, prompt and session failures, plus the
//! fatal conditions of an agent run.

use thiserror::Error;

/// Unified error type for Axon.
///
/// All fallible functions return `Result<T, AppError>`. Recoverable lookup
/// failures are not errors at this level; they travel as values through the
/// agent's lookup ports.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Inference provider errors, including malformed structured output
    #[error("Inference error: {0}")]
    Inference(String),

    /// Knowledge base errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Web search errors
    #[error("Search error: {0}")]
    Search(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Session store errors
    #[error("Session error: {0}")]
    Session(String),

    /// The conversation history holds no user-authored message
    #[error("No user turn found in conversation history")]
    NoUserTurnFound,

    /// A completed run did not append an assistant message
    #[error("Agent did not return a valid response (final assistant message not found)")]
    MissingFinalAnswer,

    /// Rejected client input for document upload
    #[error("{0}")]
    InvalidUpload(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether this error was caused by bad client input rather than a server fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::InvalidUpload(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(AppError::InvalidUpload("Only PDF files are supported.".into()).is_client_error());
        assert!(!AppError::NoUserTurnFound.is_client_error());
        assert!(!AppError::Inference("timeout".into()).is_client_error());
    }

    #[test]
    fn test_serde_json_conversion() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
