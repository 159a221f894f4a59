//! Ollama local LLM backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::traits::non_empty;
use crate::{ClientConfig, CompletionClient, CompletionError};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "phi3:mini";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for a local Ollama server's generate endpoint
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    timeout: Duration,
    max_tokens: u32,
    temperature: f32,
}

impl OllamaClient {
    /// Create a client from config.
    ///
    /// Falls back to `OLLAMA_HOST` / `OLLAMA_MODEL`, then to localhost:11434
    /// and `phi3:mini`.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config
                .base_url
                .clone()
                .or_else(|| std::env::var("OLLAMA_HOST").ok())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config
                .model
                .clone()
                .or_else(|| std::env::var("OLLAMA_MODEL").ok())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: config.timeout.unwrap_or(DEFAULT_TIMEOUT),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    fn build_request(&self, prompt: &str, system_message: Option<&str>) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            system: system_message.map(String::from),
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        }
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
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
            .post(format!("{}/api/generate", self.base_url))
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

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        non_empty(body.response)
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .is_ok()
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization_omits_missing_system() {
        let client = OllamaClient::new(&ClientConfig::new().with_model("llama3.2"));
        let request = client.build_request("hi", None);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "llama3.2");
        assert_eq!(json["stream"], false);
        assert!(json.get("system").is_none());
        assert_eq!(json["options"]["num_predict"], 1000);
    }

    #[test]
    fn test_request_serialization_with_system() {
        let client = OllamaClient::new(&ClientConfig::new().with_base_url("http://gpu-box:11434"));
        let request = client.build_request("hi", Some("sys"));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["system"], "sys");
        assert_eq!(client.base_url, "http://gpu-box:11434");
    }

    #[test]
    fn test_configured_timeout_overrides_default() {
        assert_eq!(OllamaClient::new(&ClientConfig::new()).timeout, DEFAULT_TIMEOUT);

        let config = ClientConfig::new().with_timeout(Duration::from_secs(5));
        assert_eq!(OllamaClient::new(&config).timeout, Duration::from_secs(5));
    }
}
