//! Async LLM client used by the advisory oracle
//!
//! Model-agnostic HTTP client for chat completion APIs. Supports both the
//! Anthropic messages format and OpenAI-compatible endpoints.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, VillageError};

const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

/// Plans are a few hundred tokens of JSON
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// API format type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
    max_tokens: u32,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            api_format,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }

    /// Create a client from environment variables
    ///
    /// Required: LLM_API_KEY
    /// Optional: LLM_API_URL (defaults to Anthropic API)
    /// Optional: LLM_MODEL
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var("LLM_API_KEY").map_err(|_| VillageError::Advisory("LLM_API_KEY not set".into()))?;
        let api_url = std::env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        Ok(Self::new(api_key, api_url, model))
    }

    pub fn api_format(&self) -> ApiFormat {
        self.api_format
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a completion request and return the reply text
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(system, user).await,
            ApiFormat::OpenAI => self.complete_openai(system, user).await,
        }
    }

    async fn complete_anthropic(&self, system: &str, user: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: vec![Message { role: "user", content: user }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(VillageError::Advisory(format!("API error {}: {}", status, error_text)));
        }

        let completion: AnthropicResponse = response.json().await.map_err(transport)?;

        completion
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| VillageError::Advisory("Empty response".into()))
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<String> {
        let request = OpenAIRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message { role: "user", content: user },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(VillageError::Advisory(format!("API error {}: {}", status, error_text)));
        }

        let completion: OpenAIResponse = response.json().await.map_err(transport)?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| VillageError::Advisory("Empty response".into()))
    }
}

fn transport(e: reqwest::Error) -> VillageError {
    VillageError::Advisory(e.to_string())
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format
#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = LlmClient::new(
            "test-key".into(),
            "https://api.example.com/v1/chat/completions".into(),
            "test-model".into(),
        );
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.model(), "test-model");
        assert_eq!(client.api_format(), ApiFormat::OpenAI);
        assert_eq!(client.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_anthropic_format_detected() {
        let client = LlmClient::new("k".into(), DEFAULT_API_URL.into(), DEFAULT_MODEL.into()).with_max_tokens(512);
        assert_eq!(client.api_format(), ApiFormat::Anthropic);
        assert_eq!(client.max_tokens, 512);
    }

    #[test]
    fn test_request_shape() {
        let request = OpenAIRequest {
            model: "m",
            max_tokens: 10,
            messages: vec![Message {
                role: "system",
                content: "be brief",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["max_tokens"], 10);
    }

    #[test]
    fn test_from_env_missing_key() {
        if std::env::var("LLM_API_KEY").is_err() {
            assert!(matches!(LlmClient::from_env(), Err(VillageError::Advisory(_))));
        }
    }
}
