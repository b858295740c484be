//! AI content generation: backend clients, prompts and the generator.

pub mod claude;
pub mod error;
pub mod generator;
pub mod openai;
pub mod prompts;

#[cfg(test)]
pub(crate) mod test_utils;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

pub use claude::ClaudeAiClient;
pub use error::AiError;
pub use generator::{
    AiContentGenerator, ContentGenerator, GeneratedContent, GenerationOptions, GenerationRequest,
    PreviousResult,
};
pub use openai::OpenAiAiClient;

use crate::utils::preflight::{AiCredentialInfo, AiProvider};
use crate::utils::settings::{get_env_var, get_env_vars};

/// HTTP request timeout for AI API calls.
///
/// Long enough for large diffs and long descriptions, short enough to not hang forever.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Default response size when neither config nor model says otherwise.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Metadata about an AI client implementation.
#[derive(Clone, Debug)]
pub struct AiClientMetadata {
    /// Service provider name.
    pub provider: String,
    /// Model identifier.
    pub model: String,
    /// Maximum response length in tokens.
    pub max_response_length: u32,
}

/// Trait for AI service clients.
pub trait AiClient: Send + Sync {
    /// Sends a request to the AI service and returns the raw text response.
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    /// Returns metadata about the AI client implementation.
    fn get_metadata(&self) -> AiClientMetadata;
}

/// Builds an HTTP client with the standard AI request timeout.
pub(crate) fn build_http_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// Returns the response unchanged on success, or [`AiError::ApiRequestFailed`].
pub(crate) async fn check_error_response(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response.text().await.unwrap_or_else(|e| {
        tracing::debug!("Failed to read error response body: {e}");
        String::new()
    });
    Err(AiError::ApiRequestFailed(format!("HTTP {status}: {error_text}")).into())
}

/// Builds the client for the backend chosen during preflight.
pub fn create_ai_client(
    info: &AiCredentialInfo,
    max_tokens: Option<u32>,
) -> Result<Box<dyn AiClient>> {
    let max_tokens = max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);

    let client: Box<dyn AiClient> = match info.provider {
        AiProvider::Claude => {
            let api_key =
                get_env_vars(&["CLAUDE_API_KEY", "ANTHROPIC_API_KEY", "ANTHROPIC_AUTH_TOKEN"])
                    .map_err(|_| AiError::ApiKeyNotFound("Claude"))?;
            Box::new(ClaudeAiClient::new(info.model.clone(), api_key, max_tokens)?)
        }
        AiProvider::OpenAi => {
            let api_key = get_env_vars(&["OPENAI_API_KEY", "OPENAI_AUTH_TOKEN"])
                .map_err(|_| AiError::ApiKeyNotFound("OpenAI"))?;
            Box::new(OpenAiAiClient::new_openai(
                info.model.clone(),
                api_key,
                max_tokens,
            )?)
        }
        AiProvider::Ollama => Box::new(OpenAiAiClient::new_ollama(
            info.model.clone(),
            get_env_var("OLLAMA_BASE_URL").ok(),
            max_tokens,
        )?),
    };

    Ok(client)
}
