use serde::Serialize;
use tracing::{debug, warn};

use procscribe_llm::CompletionClient;
use procscribe_state::{Aspect, InterviewState};

use crate::prompts::InterviewPrompts;

/// Asked before a topic is known
pub const OPENING_QUESTION: &str = "What is the process you would like to describe?";

/// Returned once every aspect has been covered
pub const CLOSING_STATEMENT: &str =
    "Thank you, I believe I have enough information to document this process thoroughly.";

/// Where a question came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    Opening,
    Backend,
    Fallback,
    Closing,
}

impl std::fmt::Display for QuestionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionSource::Opening => write!(f, "opening"),
            QuestionSource::Backend => write!(f, "backend"),
            QuestionSource::Fallback => write!(f, "fallback"),
            QuestionSource::Closing => write!(f, "closing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuestion {
    pub text: String,
    /// The aspect the question targets; `None` for opening and closing lines
    pub aspect: Option<Aspect>,
    pub source: QuestionSource,
}

impl GeneratedQuestion {
    pub fn is_closing(&self) -> bool {
        self.source == QuestionSource::Closing || signals_completion(&self.text)
    }
}

/// Whether an interviewer line announces the end of the interview
pub fn signals_completion(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("thank you") || lower.contains("enough information")
}

/// Trim and drop one pair of surrounding quotes
fn clean_question(raw: &str) -> String {
    let trimmed = raw.trim();
    for (open, close) in [('"', '"'), ('\'', '\''), ('“', '”')] {
        if trimmed.chars().count() >= 2 && trimmed.starts_with(open) && trimmed.ends_with(close) {
            let inner = &trimmed[open.len_utf8()..trimmed.len() - close.len_utf8()];
            return inner.trim().to_string();
        }
    }
    trimmed.to_string()
}

/// Picks the next question, asking the backend to phrase it
pub struct QuestionGenerator<'a> {
    client: &'a dyn CompletionClient,
}

impl<'a> QuestionGenerator<'a> {
    pub fn new(client: &'a dyn CompletionClient) -> Self {
        Self { client }
    }

    /// Produce exactly one question for the current state.
    ///
    /// Targets the highest-priority uncovered aspect. Backend failures and
    /// empty replies fall back to that aspect's canned question.
    pub async fn generate_question(&self, state: &InterviewState) -> GeneratedQuestion {
        if state.topic().is_none() {
            return GeneratedQuestion {
                text: OPENING_QUESTION.to_string(),
                aspect: None,
                source: QuestionSource::Opening,
            };
        }

        let Some(&aspect) = state.remaining_aspects().first() else {
            return GeneratedQuestion {
                text: CLOSING_STATEMENT.to_string(),
                aspect: None,
                source: QuestionSource::Closing,
            };
        };

        let prompt = InterviewPrompts::build_question_prompt(state, aspect);
        let system = InterviewPrompts::interviewer_system();

        match self.client.complete(&prompt, Some(&system)).await {
            Ok(raw) => {
                let text = clean_question(&raw);
                if !text.is_empty() {
                    debug!(%aspect, "Question generated by backend");
                    return GeneratedQuestion {
                        text,
                        aspect: Some(aspect),
                        source: QuestionSource::Backend,
                    };
                }
                warn!(%aspect, "Backend returned a blank question, using canned one");
            }
            Err(e) => warn!(%aspect, error = %e, "Question generation failed, using canned one"),
        }

        GeneratedQuestion {
            text: aspect.fallback_question().to_string(),
            aspect: Some(aspect),
            source: QuestionSource::Fallback,
        }
    }
}
