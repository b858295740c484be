//! OpenAI-compatible API client (works with OpenAI, Ollama, etc.)

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{build_http_client, check_error_response, AiClient, AiClientMetadata, AiError};

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const OLLAMA_BASE_URL: &str = "http://localhost:11434";

#[derive(Serialize, Debug)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize, Debug)]
struct OpenAiRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct OpenAiResponse {
    choices: Vec<Choice>,
    model: Option<String>,
}

/// OpenAI-compatible API client.
pub struct OpenAiAiClient {
    client: Client,
    /// Optional for Ollama.
    api_key: Option<String>,
    model: String,
    /// e.g. `https://api.openai.com` or `http://localhost:11434`
    base_url: String,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl OpenAiAiClient {
    /// Creates a client for any OpenAI-compatible endpoint.
    pub fn new(
        model: String,
        api_key: Option<String>,
        base_url: String,
        max_tokens: u32,
        temperature: Option<f32>,
    ) -> Result<Self> {
        Ok(Self {
            client: build_http_client()?,
            api_key,
            model,
            base_url,
            max_tokens,
            temperature,
        })
    }

    /// Creates a client for a local Ollama server.
    pub fn new_ollama(model: String, base_url: Option<String>, max_tokens: u32) -> Result<Self> {
        Self::new(
            model,
            None,
            base_url.unwrap_or_else(|| OLLAMA_BASE_URL.to_string()),
            max_tokens,
            Some(0.1),
        )
    }

    /// Creates a client for the OpenAI API.
    pub fn new_openai(model: String, api_key: String, max_tokens: u32) -> Result<Self> {
        Self::new(
            model,
            Some(api_key),
            OPENAI_BASE_URL.to_string(),
            max_tokens,
            Some(0.1),
        )
    }

    fn api_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }

    fn is_ollama(&self) -> bool {
        self.base_url.contains("localhost")
            || self.base_url.contains("127.0.0.1")
            || self.api_key.is_none()
    }

    /// GPT-5 and o1 models take `max_completion_tokens` and only the default temperature.
    fn is_gpt5_series(&self) -> bool {
        self.model.starts_with("gpt-5") || self.model.starts_with("o1")
    }

    fn build_request(&self, system_prompt: &str, user_prompt: &str) -> OpenAiRequest {
        let mut messages = Vec::new();
        if !system_prompt.is_empty() {
            messages.push(Message {
                role: "system".to_string(),
                content: system_prompt.to_string(),
            });
        }
        messages.push(Message {
            role: "user".to_string(),
            content: user_prompt.to_string(),
        });

        if self.is_gpt5_series() {
            OpenAiRequest {
                model: self.model.clone(),
                messages,
                max_tokens: None,
                max_completion_tokens: Some(self.max_tokens),
                temperature: None,
                stream: false,
            }
        } else {
            OpenAiRequest {
                model: self.model.clone(),
                messages,
                max_tokens: Some(self.max_tokens),
                max_completion_tokens: None,
                temperature: self.temperature,
                stream: false,
            }
        }
    }
}

impl AiClient for OpenAiAiClient {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let request = self.build_request(system_prompt, user_prompt);
            debug!(
                message_count = request.messages.len(),
                is_ollama = self.is_ollama(),
                uses_max_completion_tokens = self.is_gpt5_series(),
                "Built OpenAI-compatible request payload"
            );

            let api_url = self.api_url();
            info!(url = %api_url, model = %self.model, "Sending request to OpenAI-compatible API");

            let mut req_builder = self
                .client
                .post(&api_url)
                .header("Content-Type", "application/json")
                .json(&request);
            if let Some(ref api_key) = self.api_key {
                req_builder = req_builder.header("Authorization", format!("Bearer {api_key}"));
            }

            let response = req_builder
                .send()
                .await
                .map_err(|e| AiError::NetworkError(e.to_string()))?;
            let response = check_error_response(response).await?;

            let openai_response: OpenAiResponse = response
                .json()
                .await
                .map_err(|e| AiError::InvalidResponseFormat(e.to_string()))?;

            debug!(
                choice_count = openai_response.choices.len(),
                model = ?openai_response.model,
                "Received OpenAI-compatible API response"
            );

            openai_response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or_else(|| {
                    AiError::InvalidResponseFormat("No choices in response".to_string()).into()
                })
        })
    }

    fn get_metadata(&self) -> AiClientMetadata {
        let provider = if self.is_ollama() { "Ollama" } else { "OpenAI" };
        AiClientMetadata {
            provider: provider.to_string(),
            model: self.model.clone(),
            max_response_length: self.max_tokens,
        }
    }
}
