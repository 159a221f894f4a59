use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use procscribe_llm::{CompletionClient, CompletionError};
use procscribe_state::InterviewState;
use procscribe_validator::{AnswerValidator, EMPTY_ANSWER_REASON};

/// Client that replays queued responses; `None` entries (and an empty queue)
/// fail the call.
struct ScriptedClient {
    calls: AtomicUsize,
    responses: Mutex<VecDeque<Option<&'static str>>>,
}

impl ScriptedClient {
    fn new(responses: Vec<Option<&'static str>>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            responses: Mutex::new(responses.into()),
        }
    }

    fn failing() -> Self {
        Self::new(vec![])
    }

    fn calls(&self) -> usize {
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

fn state_with(interactions: &[(&str, &str)]) -> InterviewState {
    let mut state = InterviewState::new();
    state.set_topic("Fixing a squeaky door").unwrap();
    for (q, a) in interactions {
        state.add_interaction(q, a);
    }
    state
}

// ============================================================
// Empty answers
// ============================================================

#[tokio::test]
async fn test_empty_answer_rejected_without_backend_call() {
    let client = ScriptedClient::new(vec![Some(r#"{"relevant": true}"#)]);
    let mut validator = AnswerValidator::new(&client);
    let mut state = state_with(&[]);

    for answer in ["", "   ", "\n\t"] {
        let verdict = validator
            .validate_answer(&mut state, "What tools do you use?", answer)
            .await;
        assert!(!verdict.is_valid);
        assert!(!verdict.is_complete);
        assert_eq!(verdict.reason, EMPTY_ANSWER_REASON);
    }

    assert_eq!(client.calls(), 0);
    assert_eq!(state.validation_error_count(), 0);
}

// ============================================================
// Structured judgments from the backend
// ============================================================

#[tokio::test]
async fn test_backend_judgments_are_used() {
    let client = ScriptedClient::new(vec![
        Some("Here you go:\n{\"relevant\": true, \"reason\": \"names tools\"}"),
        Some(r#"{"complete": true, "reason": "all covered"}"#),
    ]);
    let mut validator = AnswerValidator::new(&client);
    let mut state = state_with(&[]);

    let verdict = validator
        .validate_answer(&mut state, "What tools do you use?", "A screwdriver")
        .await;

    assert!(verdict.is_valid);
    assert!(verdict.is_complete);
    assert!(!verdict.used_fallback);
    assert_eq!(client.calls(), 2);
    // Validation never commits the answer itself
    assert!(state.transcript().is_empty());
    assert_eq!(validator.history().len(), 1);
}

#[tokio::test]
async fn test_backend_rejection_counts_validation_error() {
    let client = ScriptedClient::new(vec![Some(
        r#"{"relevant": false, "reason": "Talks about the weather"}"#,
    )]);
    let mut validator = AnswerValidator::new(&client);
    let mut state = state_with(&[]);

    let verdict = validator
        .validate_answer(&mut state, "What tools do you use?", "It is sunny")
        .await;

    assert!(!verdict.is_valid);
    assert!(!verdict.is_complete);
    assert!(verdict.reason.contains("Talks about the weather"));
    assert_eq!(state.validation_error_count(), 1);
    // No completeness call after a rejection
    assert_eq!(client.calls(), 1);
    assert!(validator.history().is_empty());
}

// ============================================================
// Fallback paths
// ============================================================

#[tokio::test]
async fn test_free_text_relevance_falls_back_to_keyword_overlap() {
    let client = ScriptedClient::new(vec![Some("Yes, definitely relevant!"), None]);
    let mut validator = AnswerValidator::new(&client);
    let mut state = state_with(&[]);

    let verdict = validator
        .validate_answer(&mut state, "What tools do you use?", "Mostly hand tools")
        .await;

    assert!(verdict.is_valid);
    assert!(verdict.used_fallback);
}

#[tokio::test]
async fn test_keyword_fallback_rejects_unrelated_answer() {
    let client = ScriptedClient::failing();
    let mut validator = AnswerValidator::new(&client);
    let mut state = state_with(&[]);

    let verdict = validator
        .validate_answer(&mut state, "What tools do you use?", "I prefer mornings")
        .await;

    assert!(!verdict.is_valid);
    assert!(verdict.used_fallback);
    assert_eq!(state.validation_error_count(), 1);
}

#[tokio::test]
async fn test_fallback_completeness_with_five_interactions_three_aspects() {
    let client = ScriptedClient::failing();
    let validator = AnswerValidator::new(&client);
    let state = state_with(&[
        ("What is the process you would like to describe?", "Fixing a squeaky door"),
        ("What is the purpose?", "Quiet"),
        ("Which tools do you need?", "Oil can"),
        ("What are the steps?", "Lift the pin, oil it"),
        ("Anything else?", "Wipe off drips"),
    ]);
    assert_eq!(state.covered_aspects().len(), 3);

    let check = validator.check_completeness(&state).await;

    assert!(check.passed);
    assert!(!check.from_backend);
}

#[tokio::test]
async fn test_free_text_completeness_falls_back_to_coverage_rule() {
    let client = ScriptedClient::new(vec![
        Some("Looks complete to me"),
        Some("Looks complete to me"),
    ]);
    let validator = AnswerValidator::new(&client);

    let short = state_with(&[
        ("What is the process you would like to describe?", "Fixing a squeaky door"),
        ("What is the purpose?", "Quiet"),
    ]);
    let check = validator.check_completeness(&short).await;
    assert!(!check.passed);
    assert!(!check.from_backend);

    let covered = state_with(&[
        ("What is the process you would like to describe?", "Fixing a squeaky door"),
        ("What is the purpose?", "Quiet"),
        ("Which tools do you need?", "Oil can"),
        ("What are the steps?", "Lift the pin, oil it"),
        ("Anything else?", "Wipe off drips"),
    ]);
    let check = validator.check_completeness(&covered).await;
    assert!(check.passed);
    assert!(!check.from_backend);

    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn test_completeness_counts_the_answer_being_validated() {
    let client = ScriptedClient::failing();
    let mut validator = AnswerValidator::new(&client);
    let mut state = state_with(&[
        ("What is the process you would like to describe?", "Fixing a squeaky door"),
        ("What is the purpose?", "Quiet"),
        ("Which tools do you need?", "Oil can"),
        ("Anything else?", "Wipe off drips"),
    ]);

    let verdict = validator
        .validate_answer(&mut state, "What are the steps?", "Lift the pin and apply the steps")
        .await;

    assert!(verdict.is_valid);
    assert!(verdict.is_complete);
    assert_eq!(state.transcript().len(), 4);
}

#[tokio::test]
async fn test_validation_stats() {
    let client = ScriptedClient::failing();
    let mut validator = AnswerValidator::new(&client);
    let mut state = state_with(&[]);

    validator
        .validate_answer(&mut state, "What tools do you use?", "hand tools")
        .await;
    validator
        .validate_answer(&mut state, "What tools do you use?", "unrelated")
        .await;

    let stats = validator.stats();
    assert_eq!(stats.total_validations, 1);
    assert_eq!(stats.relevant_answers, 1);
    assert_eq!(stats.complete_conversations, 0);
    assert!((stats.relevance_rate - 1.0).abs() < f64::EPSILON);
    assert_eq!(stats.completion_rate, 0.0);
}
