//! Anthropic Messages API client.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{build_http_client, check_error_response, AiClient, AiClientMetadata, AiError};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<Content>,
}

/// Claude API client.
pub struct ClaudeAiClient {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
}

impl ClaudeAiClient {
    /// Creates a client for the public Anthropic endpoint.
    pub fn new(model: String, api_key: String, max_tokens: u32) -> Result<Self> {
        Ok(Self {
            client: build_http_client()?,
            api_key,
            model,
            max_tokens,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Points the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

impl AiClient for ClaudeAiClient {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            debug!(
                system_prompt_len = system_prompt.len(),
                user_prompt_len = user_prompt.len(),
                model = %self.model,
                "Preparing Claude API request"
            );

            let request = ClaudeRequest {
                model: self.model.clone(),
                max_tokens: self.max_tokens,
                system: system_prompt.to_string(),
                messages: vec![Message {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                }],
            };

            let url = self.messages_url();
            info!(url = %url, model = %self.model, max_tokens = self.max_tokens, "Sending request to Claude API");

            let response = self
                .client
                .post(&url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request)
                .send()
                .await
                .map_err(|e| AiError::NetworkError(e.to_string()))?;

            let response = check_error_response(response).await?;

            let claude_response: ClaudeResponse = response
                .json()
                .await
                .map_err(|e| AiError::InvalidResponseFormat(e.to_string()))?;

            let text = claude_response
                .content
                .into_iter()
                .find(|c| c.content_type == "text")
                .map(|c| c.text)
                .ok_or_else(|| {
                    AiError::InvalidResponseFormat("No text content in response".to_string())
                })?;

            debug!(response_len = text.len(), "Received Claude API response");
            Ok(text)
        })
    }

    fn get_metadata(&self) -> AiClientMetadata {
        AiClientMetadata {
            provider: "Anthropic".to_string(),
            model: self.model.clone(),
            max_response_length: self.max_tokens,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ClaudeAiClient {
        ClaudeAiClient::new("claude-test".to_string(), "sk-ant".to_string(), 1024)
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn returns_first_text_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-test",
                "max_tokens": 1024,
                "system": "be brief"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "title: Hi\ndescription: There"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server)
            .send_request("be brief", "describe")
            .await
            .unwrap();
        assert_eq!(text, "title: Hi\ndescription: There");
    }

    #[tokio::test]
    async fn http_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = client(&server).send_request("s", "u").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("529"), "{message}");
        assert!(message.contains("overloaded"), "{message}");
    }

    #[tokio::test]
    async fn missing_text_block_is_invalid_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"content": []})),
            )
            .mount(&server)
            .await;

        let err = client(&server).send_request("s", "u").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AiError>(),
            Some(AiError::InvalidResponseFormat(_))
        ));
    }

    #[test]
    fn metadata_reports_model() {
        let client = ClaudeAiClient::new("m".to_string(), "k".to_string(), 2048).unwrap();
        let meta = client.get_metadata();
        assert_eq!(meta.provider, "Anthropic");
        assert_eq!(meta.max_response_length, 2048);
    }
}
