//! Custom error types for translation operations

use thiserror::Error;

/// Message shown to users when no model exists (or can be fetched) for a pair.
pub const MODEL_UNAVAILABLE_MESSAGE: &str = "Model not available for this language pair.";

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Model or tokenizer could not be fetched for the requested pair.
    ///
    /// Missing pairs, network failures and malformed identifiers all land here.
    #[error("Model not available for this language pair.")]
    ModelUnavailable {
        /// Hub identifier that failed to load
        model_id: String,
        /// Underlying loader diagnostic, kept for logs
        reason: String,
    },

    /// Language name is not part of the language table
    #[error("Unknown language: {name}")]
    UnknownLanguage {
        /// Name as supplied by the caller
        name: String,
    },

    /// Model loaded but generation or decoding failed
    #[error("Generation failed for {model_id}: {message}")]
    Generation {
        /// Hub identifier of the model in use
        model_id: String,
        /// Failure description
        message: String,
    },

    /// Request body could not be read as a translation request
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Failure description
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Failure description
        message: String,
    },

    /// Wrapper for internal failures
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Blocking model task panicked or was cancelled
    #[error("Model task failed: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TranslationError {
    /// Short machine-readable code used by the JSON API
    pub fn code(&self) -> &'static str {
        match self {
            TranslationError::ModelUnavailable { .. } => "model_unavailable",
            TranslationError::UnknownLanguage { .. } => "unknown_language",
            TranslationError::InvalidRequest { .. } => "invalid_request",
            TranslationError::ConfigError { .. } => "config_error",
            _ => "translation_error",
        }
    }

    /// Whether this is the model-unavailable case
    pub fn is_unavailable(&self) -> bool {
        matches!(self, TranslationError::ModelUnavailable { .. })
    }
}

impl From<anyhow::Error> for TranslationError {
    fn from(err: anyhow::Error) -> Self {
        TranslationError::InternalError(err.to_string())
    }
}

impl From<config::ConfigError> for TranslationError {
    fn from(err: config::ConfigError) -> Self {
        TranslationError::ConfigError {
            message: err.to_string(),
        }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
