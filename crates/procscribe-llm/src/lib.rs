mod offline;
mod ollama;
mod openrouter;
mod traits;

pub use offline::OfflineClient;
pub use ollama::OllamaClient;
pub use openrouter::OpenRouterClient;
pub use traits::{BackendType, ClientConfig, CompletionClient, CompletionError};

/// Create a completion client by backend type
pub fn create_client(
    backend: BackendType,
    config: &ClientConfig,
) -> Result<Box<dyn CompletionClient>, CompletionError> {
    match backend {
        BackendType::OpenRouter => Ok(Box::new(OpenRouterClient::new(config)?)),
        BackendType::Ollama => Ok(Box::new(OllamaClient::new(config))),
        BackendType::Offline => Ok(Box::new(OfflineClient::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_client_always_fails() {
        let client = create_client(BackendType::Offline, &ClientConfig::default()).unwrap();
        assert_eq!(client.name(), "offline");
        assert!(client.is_available().await);
        assert!(matches!(
            client.complete("anything", None).await,
            Err(CompletionError::Offline)
        ));
    }

    #[test]
    fn test_create_ollama_client_needs_no_key() {
        let client = create_client(BackendType::Ollama, &ClientConfig::default()).unwrap();
        assert_eq!(client.name(), "ollama");
    }
}
