use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use procscribe_llm::CompletionClient;
use procscribe_state::InterviewState;

use crate::heuristics::{coverage_rule, keyword_overlap};
use crate::judgment::{parse_judgment, CompletenessJudgment, RelevanceJudgment};
use crate::ValidatorPrompts;

pub const EMPTY_ANSWER_REASON: &str = "Answer is empty. Please provide a response.";

/// Outcome of validating one answer
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// The answer may be committed to the transcript
    pub is_valid: bool,
    /// The interview has gathered enough information
    pub is_complete: bool,
    pub reason: String,
    /// A rule-based fallback replaced at least one backend judgment
    pub used_fallback: bool,
}

impl Verdict {
    fn rejected(reason: impl Into<String>, used_fallback: bool) -> Self {
        Self {
            is_valid: false,
            is_complete: false,
            reason: reason.into(),
            used_fallback,
        }
    }
}

/// A judgment together with where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    pub passed: bool,
    pub reason: String,
    pub from_backend: bool,
}

impl Check {
    fn from_rule((passed, reason): (bool, String)) -> Self {
        Self {
            passed,
            reason,
            from_backend: false,
        }
    }
}

/// Record of an answer that passed the relevance check
#[derive(Debug, Clone, Serialize)]
pub struct ValidationRecord {
    pub question: String,
    pub answer: String,
    pub relevant: bool,
    pub complete: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationStats {
    pub total_validations: usize,
    pub relevant_answers: usize,
    pub complete_conversations: usize,
    pub relevance_rate: f64,
    pub completion_rate: f64,
}

/// Judges answers with the completion backend, falling back to rules
pub struct AnswerValidator<'a> {
    client: &'a dyn CompletionClient,
    history: Vec<ValidationRecord>,
}

impl<'a> AnswerValidator<'a> {
    pub fn new(client: &'a dyn CompletionClient) -> Self {
        Self {
            client,
            history: Vec::new(),
        }
    }

    /// Validate an answer before it is committed to the transcript.
    ///
    /// Irrelevant answers bump the state's validation error count; nothing
    /// else in `state` is modified. Completeness is judged as if the answer
    /// had already been accepted.
    pub async fn validate_answer(
        &mut self,
        state: &mut InterviewState,
        question: &str,
        answer: &str,
    ) -> Verdict {
        if answer.trim().is_empty() {
            return Verdict::rejected(EMPTY_ANSWER_REASON, false);
        }

        let relevance = self.check_relevance(question, answer).await;
        if !relevance.passed {
            state.record_validation_error();
            info!(
                errors = state.validation_error_count(),
                "Answer rejected as irrelevant"
            );
            return Verdict::rejected(
                format!(
                    "Answer is not relevant to the question. {}",
                    relevance.reason
                ),
                !relevance.from_backend,
            );
        }

        let mut preview = state.clone();
        preview.add_interaction(question, answer);
        let completeness = self.check_completeness(&preview).await;

        self.history.push(ValidationRecord {
            question: question.to_string(),
            answer: answer.to_string(),
            relevant: true,
            complete: completeness.passed,
            timestamp: Utc::now(),
        });

        Verdict {
            is_valid: true,
            is_complete: completeness.passed,
            reason: "Answer is valid and relevant.".to_string(),
            used_fallback: !relevance.from_backend || !completeness.from_backend,
        }
    }

    /// Ask the backend whether `answer` addresses `question`.
    pub async fn check_relevance(&self, question: &str, answer: &str) -> Check {
        let prompt = ValidatorPrompts::build_relevance_prompt(question, answer);

        match self
            .client
            .complete(&prompt, Some(ValidatorPrompts::relevance_system()))
            .await
        {
            Ok(output) => match parse_judgment::<RelevanceJudgment>(&output) {
                Ok(judgment) => {
                    debug!(relevant = judgment.relevant, "Relevance judged by backend");
                    return Check {
                        passed: judgment.relevant,
                        reason: judgment.reason().to_string(),
                        from_backend: true,
                    };
                }
                Err(e) => warn!(error = %e, "Unparseable relevance judgment, using keyword overlap"),
            },
            Err(e) => warn!(error = %e, "Relevance check failed, using keyword overlap"),
        }

        Check::from_rule(keyword_overlap(question, answer))
    }

    /// Ask the backend whether the transcript covers enough ground.
    pub async fn check_completeness(&self, state: &InterviewState) -> Check {
        let prompt = ValidatorPrompts::build_completeness_prompt(
            state.topic().unwrap_or_default(),
            &state.get_conversation_text(),
        );

        match self
            .client
            .complete(&prompt, Some(ValidatorPrompts::completeness_system()))
            .await
        {
            Ok(output) => match parse_judgment::<CompletenessJudgment>(&output) {
                Ok(judgment) => {
                    debug!(complete = judgment.complete, "Completeness judged by backend");
                    return Check {
                        passed: judgment.complete,
                        reason: judgment.reason().to_string(),
                        from_backend: true,
                    };
                }
                Err(e) => {
                    warn!(error = %e, "Unparseable completeness judgment, using coverage rule")
                }
            },
            Err(e) => warn!(error = %e, "Completeness check failed, using coverage rule"),
        }

        Check::from_rule(coverage_rule(state))
    }

    pub fn history(&self) -> &[ValidationRecord] {
        &self.history
    }

    pub fn stats(&self) -> ValidationStats {
        let total = self.history.len();
        let relevant = self.history.iter().filter(|r| r.relevant).count();
        let complete = self.history.iter().filter(|r| r.complete).count();
        let rate = |n: usize| if total > 0 { n as f64 / total as f64 } else { 0.0 };

        ValidationStats {
            total_validations: total,
            relevant_answers: relevant,
            complete_conversations: complete,
            relevance_rate: rate(relevant),
            completion_rate: rate(complete),
        }
    }
}
