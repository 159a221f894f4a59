//! OpenRouter (OpenAI-compatible chat completions) backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::traits::non_empty;
use crate::{ClientConfig, CompletionClient, CompletionError};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "deepseek/deepseek-r1";
const DEFAULT_API_KEY_ENV: &str = "OPENROUTER_API_KEY";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat-completions client for OpenRouter or any OpenAI-compatible endpoint
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    timeout: Duration,
    max_tokens: u32,
    temperature: f32,
}

impl OpenRouterClient {
    /// Create a client from config, reading the API key from the environment.
    pub fn new(config: &ClientConfig) -> Result<Self, CompletionError> {
        let key_var = config
            .api_key_env
            .clone()
            .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string());
        let api_key = std::env::var(&key_var)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(CompletionError::MissingApiKey(key_var))?;
        Ok(Self::with_api_key(config, api_key))
    }

    /// Create a client with an explicit API key.
    pub fn with_api_key(config: &ClientConfig, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: api_key.into(),
            timeout: config.timeout.unwrap_or(DEFAULT_TIMEOUT),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    fn build_request(&self, prompt: &str, system_message: Option<&str>) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_message {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: 0.9,
            frequency_penalty: 0.1,
            presence_penalty: 0.1,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn complete(
        &self,
        prompt: &str,
        system_message: Option<&str>,
    ) -> Result<String, CompletionError> {
        let request = self.build_request(prompt, system_message);

        debug!(
            backend = self.name(),
            model = %self.model,
            prompt_len = prompt.len(),
            "Requesting completion"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::from_request(e, self.timeout))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status, body });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CompletionError::MalformedResponse("no choices in response".into()))?;

        non_empty(content)
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(format!("{}/models", self.base_url))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_includes_system_message_first() {
        let client = OpenRouterClient::with_api_key(&ClientConfig::default(), "key");
        let request = client.build_request("hello", Some("be brief"));

        assert_eq!(request.model, DEFAULT_MODEL);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].content, "hello");
    }

    #[test]
    fn test_request_without_system_message() {
        let config = ClientConfig::new().with_model("openai/gpt-4o-mini");
        let client = OpenRouterClient::with_api_key(&config, "key");
        let request = client.build_request("hello", None);

        assert_eq!(request.model, "openai/gpt-4o-mini");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
    }

    #[test]
    fn test_response_with_null_content_is_malformed() {
        let body: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(body.choices[0].message.content.is_none());
    }

    #[test]
    fn test_missing_api_key_is_reported() {
        let config = ClientConfig::new().with_api_key_env("PROCSCRIBE_TEST_UNSET_KEY");
        let err = OpenRouterClient::new(&config).err().unwrap();
        assert!(matches!(err, CompletionError::MissingApiKey(ref v) if v == "PROCSCRIBE_TEST_UNSET_KEY"));
    }
}
