use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while asking a backend for a completion
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),

    #[error("Request to completion backend failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Completion request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Completion backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response format: {0}")]
    MalformedResponse(String),

    #[error("Completion backend returned an empty response")]
    EmptyResponse,

    #[error("Completion backend is disabled (offline mode)")]
    Offline,
}

impl CompletionError {
    /// Map a reqwest error, separating timeouts from other transport failures
    pub(crate) fn from_request(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            CompletionError::Timeout(timeout)
        } else {
            CompletionError::Request(err)
        }
    }
}

/// Configuration shared by the HTTP backends
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Override for the backend's base URL
    pub base_url: Option<String>,
    /// Model to request (backend default when None)
    pub model: Option<String>,
    /// Environment variable holding the API key, for backends that need one
    pub api_key_env: Option<String>,
    /// Per-request timeout
    pub timeout: Option<Duration>,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: None,
            api_key_env: None,
            timeout: None,
            max_tokens: 1000,
            temperature: 0.3,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key_env = Some(var.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Supported completion backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendType {
    OpenRouter,
    Ollama,
    Offline,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::OpenRouter => write!(f, "openrouter"),
            BackendType::Ollama => write!(f, "ollama"),
            BackendType::Offline => write!(f, "offline"),
        }
    }
}

impl std::str::FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openrouter" | "open-router" | "deepseek" => Ok(BackendType::OpenRouter),
            "ollama" => Ok(BackendType::Ollama),
            "offline" | "none" => Ok(BackendType::Offline),
            _ => Err(format!("Unknown backend: {}", s)),
        }
    }
}

/// A text-completion service.
///
/// Implementations must resolve every call to either text or a
/// [`CompletionError`]; callers substitute their own fallback on error.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Human-readable name of the backend
    fn name(&self) -> &str;

    /// Complete `prompt`, optionally steered by a system message
    async fn complete(
        &self,
        prompt: &str,
        system_message: Option<&str>,
    ) -> Result<String, CompletionError>;

    /// Check whether the backend can be reached
    async fn is_available(&self) -> bool;
}

/// Reject blank completions so callers only ever see usable text
pub(crate) fn non_empty(text: String) -> Result<String, CompletionError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(CompletionError::EmptyResponse)
    } else {
        Ok(trimmed.to_string())
    }
}
