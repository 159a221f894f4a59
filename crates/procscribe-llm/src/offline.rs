use async_trait::async_trait;

use crate::{CompletionClient, CompletionError};

/// Backend that never answers, so every caller takes its fallback path
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineClient;

impl OfflineClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CompletionClient for OfflineClient {
    fn name(&self) -> &str {
        "offline"
    }

    async fn complete(
        &self,
        _prompt: &str,
        _system_message: Option<&str>,
    ) -> Result<String, CompletionError> {
        Err(CompletionError::Offline)
    }

    async fn is_available(&self) -> bool {
        true
    }
}
