//! # procscribe-core
//!
//! Interview orchestration: question generation, document extraction and
//! the [`InterviewRunner`] driver loop. Everything that needs language
//! understanding goes through an injected
//! [`CompletionClient`](procscribe_llm::CompletionClient) and degrades to
//! built-in behaviour when it fails.

mod context;
mod error;
mod extractor;
mod outcome;
mod prompts;
mod questions;
mod runner;
mod terminal;

#[cfg(test)]
mod test_support;

pub use context::{
    InterviewContext, InterviewSettings, DEFAULT_AUTOSAVE_EVERY, DEFAULT_MAX_QUESTIONS,
    DEFAULT_STATE_FILE,
};
pub use error::InterviewError;
pub use extractor::{
    document_file_name, ensure_heading, fallback_document, filter_unsupported_lines,
    DocumentExtractor, DocumentSource, ProcessDocument,
};
pub use outcome::{InterviewOutcome, InterviewSummary};
pub use prompts::InterviewPrompts;
pub use questions::{
    signals_completion, GeneratedQuestion, QuestionGenerator, QuestionSource, CLOSING_STATEMENT,
    OPENING_QUESTION,
};
pub use runner::InterviewRunner;
pub use terminal::{is_exit_command, Terminal, EXIT_COMMANDS};
