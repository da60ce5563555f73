//! LLM chat-completions client
//!
//! Client for an OpenAI-compatible `/v1/chat/completions` endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::{AppError, AppResult};

/// Client for the chat-completions API
#[derive(Clone)]
pub struct LlmClient {
    api_endpoint: String,
    api_key: String,
    model: String,
    http_client: Client,
}

/// One message of a chat-completions conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body of a chat completion
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// Response body of a chat completion
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Trimmed content of the first choice, if any
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .filter(|content| !content.is_empty())
    }
}

impl LlmClient {
    /// Create a new LLM client
    pub fn new(
        api_endpoint: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_endpoint,
            api_key,
            model,
            http_client,
        })
    }

    /// Create a client from configuration; `None` when no API key is set
    pub fn from_config(config: &LlmConfig) -> AppResult<Option<Self>> {
        let Some(api_key) = config.api_key() else {
            return Ok(None);
        };

        Self::new(
            config.endpoint.clone(),
            api_key.to_string(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )
        .map(Some)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request a completion and return the first choice's text
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> AppResult<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
        };

        let response = self
            .http_client
            .post(&self.api_endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalService(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse response: {}", e)))?;

        result
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| AppError::ExternalService("Completion had no content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_content_is_trimmed() {
        let response: ChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  Sow in June.\n" } },
                { "message": { "role": "assistant", "content": "ignored" } }
            ]
        }))
        .unwrap();

        assert_eq!(response.first_content(), Some("Sow in June."));
    }

    #[test]
    fn test_empty_content_is_none() {
        let response: ChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [ { "message": { "role": "assistant", "content": "   " } } ]
        }))
        .unwrap();
        assert_eq!(response.first_content(), None);

        let response: ChatCompletionResponse =
            serde_json::from_value(serde_json::json!({ "choices": [] })).unwrap();
        assert_eq!(response.first_content(), None);
    }

    #[test]
    fn test_from_config_without_key() {
        let client = LlmClient::from_config(&LlmConfig::default()).unwrap();
        assert!(client.is_none());
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatCompletionRequest {
            model: "gpt-4-turbo".to_string(),
            messages: vec![ChatMessage::system("ctx"), ChatMessage::user("hi")],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
    }
}
