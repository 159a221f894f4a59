use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// What an interview produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewSummary {
    pub topic: Option<String>,
    pub interactions: usize,
    pub aspects_covered: usize,
    pub validation_errors: u32,
    /// Set when the user chose to save the document
    pub document_path: Option<PathBuf>,
    pub total_duration_secs: f64,
}

/// The final outcome of an interview
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InterviewOutcome {
    /// Enough information was gathered
    Completed(InterviewSummary),
    /// The user typed an exit word or closed input
    UserEnded(InterviewSummary),
    /// Ctrl+C between turns
    Interrupted(InterviewSummary),
    /// Hit the question limit before completion
    QuestionLimitReached(InterviewSummary),
    /// Ended before anything was recorded
    NoTranscript { total_duration_secs: f64 },
}

impl InterviewOutcome {
    pub fn no_transcript(duration: Duration) -> Self {
        Self::NoTranscript {
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn summary(&self) -> Option<&InterviewSummary> {
        match self {
            Self::Completed(s)
            | Self::UserEnded(s)
            | Self::Interrupted(s)
            | Self::QuestionLimitReached(s) => Some(s),
            Self::NoTranscript { .. } => None,
        }
    }

    pub fn interactions(&self) -> usize {
        self.summary().map_or(0, |s| s.interactions)
    }

    pub fn total_duration_secs(&self) -> f64 {
        match self {
            Self::NoTranscript {
                total_duration_secs,
            } => *total_duration_secs,
            _ => self.summary().map_or(0.0, |s| s.total_duration_secs),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed(_) | Self::UserEnded(_) => 0,
            Self::Interrupted(_) => 130,
            Self::QuestionLimitReached(_) | Self::NoTranscript { .. } => 1,
        }
    }
}
