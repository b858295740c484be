//! Hosting provider errors.

use thiserror::Error;

/// Errors raised by the GitHub and GitLab adapters.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No API token was found for the provider.
    #[error("{provider} token not found. Set {variables}")]
    MissingToken {
        /// Provider display name.
        provider: &'static str,
        /// Environment variables that were checked.
        variables: &'static str,
    },

    /// The API answered with a non-success status; `body` is the raw response text.
    #[error("HTTP {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body as returned by the provider.
        body: String,
    },

    /// The request could not be sent or the connection failed.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body did not have the expected shape.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// The repository identifier cannot be used with this provider.
    #[error("Invalid repository identifier '{0}'")]
    InvalidRepository(String),

    /// The configured API base URL cannot carry a path.
    #[error("Invalid API URL '{0}'")]
    InvalidUrl(String),
}
