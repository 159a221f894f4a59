//! Interview state management.
//!
//! Holds the topic, the question/answer transcript and the set of covered
//! aspects, and persists them as a flat JSON snapshot so an interview can
//! be resumed.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::Aspect;

/// Number of interactions included in the recent-context window by default
pub const DEFAULT_RECENT_WINDOW: usize = 3;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Process topic cannot be empty")]
    EmptyTopic,

    #[error("Process topic is already set to '{0}'")]
    TopicAlreadySet(String),

    #[error("Failed to read state file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write state file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse state file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One question and the answer that was accepted for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub question: String,
    pub answer: String,
}

impl Interaction {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// State of a single interview session.
///
/// The serialized form of this struct is the persisted snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewState {
    topic: Option<String>,
    transcript: Vec<Interaction>,
    is_complete: bool,
    covered_aspects: BTreeSet<Aspect>,
    start_time: DateTime<Utc>,
    validation_error_count: u32,
}

/// Summary figures for a session
#[derive(Debug, Clone, Serialize)]
pub struct StateStats {
    pub topic: Option<String>,
    pub total_interactions: usize,
    pub covered_aspects: Vec<Aspect>,
    pub is_complete: bool,
    pub validation_errors: u32,
    pub duration_minutes: f64,
}

impl Default for InterviewState {
    fn default() -> Self {
        Self::new()
    }
}

impl InterviewState {
    pub fn new() -> Self {
        Self {
            topic: None,
            transcript: Vec::new(),
            is_complete: false,
            covered_aspects: BTreeSet::new(),
            start_time: Utc::now(),
            validation_error_count: 0,
        }
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn transcript(&self) -> &[Interaction] {
        &self.transcript
    }

    pub fn covered_aspects(&self) -> &BTreeSet<Aspect> {
        &self.covered_aspects
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn validation_error_count(&self) -> u32 {
        self.validation_error_count
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Set the process topic. Only the first non-empty topic is accepted.
    pub fn set_topic(&mut self, topic: &str) -> Result<(), StateError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(StateError::EmptyTopic);
        }
        if let Some(ref existing) = self.topic {
            return Err(StateError::TopicAlreadySet(existing.clone()));
        }
        self.topic = Some(topic.to_string());
        Ok(())
    }

    /// Append an accepted interaction and mark the aspect its question is about.
    ///
    /// Coverage is inferred from the question wording only.
    pub fn add_interaction(&mut self, question: &str, answer: &str) {
        self.transcript.push(Interaction::new(question, answer));

        if let Some(aspect) = Aspect::from_question(question) {
            if self.covered_aspects.insert(aspect) {
                debug!(%aspect, "Aspect covered");
            }
        }
    }

    pub fn mark_complete(&mut self) {
        self.is_complete = true;
    }

    pub fn record_validation_error(&mut self) {
        self.validation_error_count += 1;
    }

    /// Aspects not yet covered, in interview priority order
    pub fn remaining_aspects(&self) -> Vec<Aspect> {
        Aspect::ALL
            .into_iter()
            .filter(|a| !self.covered_aspects.contains(a))
            .collect()
    }

    /// Render the topic and full transcript for a prompt
    pub fn get_conversation_text(&self) -> String {
        let mut text = format!(
            "Process Topic: {}\n\n",
            self.topic.as_deref().unwrap_or("(not set)")
        );
        for (i, interaction) in self.transcript.iter().enumerate() {
            text.push_str(&format!("Interaction {}:\n", i + 1));
            text.push_str(&format!("Question: {}\n", interaction.question));
            text.push_str(&format!("Answer: {}\n\n", interaction.answer));
        }
        text
    }

    /// Render only the last `last_n` interactions
    pub fn get_recent_context(&self, last_n: usize) -> String {
        let start = self.transcript.len().saturating_sub(last_n);
        let mut text = String::new();
        for (i, interaction) in self.transcript[start..].iter().enumerate() {
            text.push_str(&format!("Recent {}:\n", i + 1));
            text.push_str(&format!("Q: {}\n", interaction.question));
            text.push_str(&format!("A: {}\n\n", interaction.answer));
        }
        text
    }

    pub fn stats(&self) -> StateStats {
        let elapsed = Utc::now().signed_duration_since(self.start_time);
        StateStats {
            topic: self.topic.clone(),
            total_interactions: self.transcript.len(),
            covered_aspects: self.covered_aspects.iter().copied().collect(),
            is_complete: self.is_complete,
            validation_errors: self.validation_error_count,
            duration_minutes: elapsed.num_milliseconds() as f64 / 60_000.0,
        }
    }

    /// Write the whole state to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StateError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| StateError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), interactions = self.transcript.len(), "State saved");
        Ok(())
    }

    /// Load a saved state from `path`.
    pub fn load(path: &Path) -> Result<Self, StateError> {
        let content = std::fs::read_to_string(path).map_err(|source| StateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| StateError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replace this state with the one saved at `path`.
    ///
    /// On error `self` is left untouched and the error is returned for
    /// reporting.
    pub fn restore_from(&mut self, path: &Path) -> Result<(), StateError> {
        *self = Self::load(path)?;
        Ok(())
    }
}
