use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use procscribe_llm::{CompletionClient, CompletionError};

/// Replays queued responses; `None` entries and an empty queue fail the call
pub(crate) struct ScriptedClient {
    calls: AtomicUsize,
    responses: Mutex<VecDeque<Option<&'static str>>>,
}

impl ScriptedClient {
    pub(crate) fn new(responses: Vec<Option<&'static str>>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            responses: Mutex::new(responses.into()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self::new(vec![])
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        _prompt: &str,
        _system_message: Option<&str>,
    ) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.lock().unwrap().pop_front().flatten() {
            Some(text) => Ok(text.to_string()),
            None => Err(CompletionError::Offline),
        }
    }

    async fn is_available(&self) -> bool {
        true
    }
}
