//! AI backend errors.

use thiserror::Error;

/// Errors raised while talking to an AI backend.
#[derive(Error, Debug)]
pub enum AiError {
    /// API key not found in environment variables or settings.
    #[error("{0} API key not found")]
    ApiKeyNotFound(&'static str),

    /// The API answered with a non-success status.
    #[error("AI API request failed: {0}")]
    ApiRequestFailed(String),

    /// The API response did not have the expected shape.
    #[error("Invalid response format from AI API: {0}")]
    InvalidResponseFormat(String),

    /// The model's answer could not be read as a title and description.
    #[error("Failed to parse generated content: {0}")]
    ContentParsingFailed(String),

    /// Network connectivity error.
    #[error("Network error: {0}")]
    NetworkError(String),
}
