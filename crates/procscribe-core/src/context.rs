use std::path::PathBuf;
use std::time::{Duration, Instant};

use procscribe_state::InterviewState;

pub const DEFAULT_MAX_QUESTIONS: usize = 20;
pub const DEFAULT_AUTOSAVE_EVERY: usize = 3;
pub const DEFAULT_STATE_FILE: &str = "interview_state.json";

/// Knobs for one interview run
#[derive(Debug, Clone)]
pub struct InterviewSettings {
    /// Accepted answers after the opening one before the interview stops
    pub max_questions: usize,
    /// Save progress after every N accepted answers; 0 disables autosave
    pub autosave_every: usize,
    pub state_path: PathBuf,
    /// Directory saved documents are written to
    pub output_dir: PathBuf,
    /// Restore an existing state file without asking
    pub resume: bool,
}

impl Default for InterviewSettings {
    fn default() -> Self {
        Self {
            max_questions: DEFAULT_MAX_QUESTIONS,
            autosave_every: DEFAULT_AUTOSAVE_EVERY,
            state_path: PathBuf::from(DEFAULT_STATE_FILE),
            output_dir: PathBuf::from("."),
            resume: false,
        }
    }
}

impl InterviewSettings {
    pub fn with_max_questions(mut self, max: usize) -> Self {
        self.max_questions = max;
        self
    }

    pub fn with_autosave_every(mut self, every: usize) -> Self {
        self.autosave_every = every;
        self
    }

    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = path.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }
}

/// Mutable bookkeeping for a running interview
#[derive(Debug)]
pub struct InterviewContext {
    pub state: InterviewState,
    /// Accepted answers, not counting the opening topic
    pub questions_answered: usize,
    max_questions: usize,
    started_at: Instant,
}

impl InterviewContext {
    pub fn new(state: InterviewState, max_questions: usize) -> Self {
        // A restored transcript already holds the opening interaction
        let questions_answered = state.transcript().len().saturating_sub(1);
        Self {
            state,
            questions_answered,
            max_questions,
            started_at: Instant::now(),
        }
    }

    pub fn should_continue(&self) -> bool {
        self.questions_answered < self.max_questions
    }

    pub fn record_answer(&mut self) {
        self.questions_answered += 1;
    }

    pub fn autosave_due(&self, every: usize) -> bool {
        every > 0 && self.questions_answered > 0 && self.questions_answered % every == 0
    }

    pub fn total_duration(&self) -> Duration {
        self.started_at.elapsed()
    }
}
