use serde::Serialize;
use tracing::{debug, warn};

use procscribe_llm::CompletionClient;
use procscribe_state::InterviewState;

use crate::prompts::InterviewPrompts;

/// Documents shorter than this after filtering are returned unfiltered
const MIN_FILTERED_LINES: usize = 10;
/// Lines with fewer words than this are always kept
const SHORT_LINE_WORDS: usize = 5;
/// Only words longer than this count as evidence from the conversation
const EVIDENCE_WORD_LEN: usize = 5;

const UNTITLED: &str = "Untitled";

/// Sections the transcript-only document can open, in match priority order
const FALLBACK_SECTIONS: &[(&[&str], &str)] = &[
    (&["purpose", "why"], "## Purpose"),
    (&["input", "material"], "## Inputs"),
    (&["tool", "equipment"], "## Tools"),
    (&["step", "instruction"], "## Steps"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSource {
    Backend,
    Fallback,
}

/// The Markdown process document compiled from an interview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDocument {
    pub markdown: String,
    pub source: DocumentSource,
    /// Unsupported lines were removed from the backend's draft
    pub filtered: bool,
}

impl ProcessDocument {
    pub fn line_count(&self) -> usize {
        self.markdown.lines().count()
    }
}

/// File name for a saved document: `<topic>_process.md` with spaces and
/// path separators replaced by underscores.
pub fn document_file_name(topic: &str) -> String {
    let stem: String = topic
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    let stem = if stem.is_empty() { UNTITLED } else { &stem };
    format!("{}_process.md", stem)
}

/// Prepend a `# Process:` title unless the document already opens with one
pub fn ensure_heading(document: &str, topic: &str) -> String {
    if document.starts_with("# ") {
        document.to_string()
    } else {
        format!("# Process: {}\n\n{}", topic, document)
    }
}

/// Drop lines that look unsupported by the conversation.
///
/// Headings are kept, blank lines dropped. Other lines survive when they
/// are short or share a long word with the conversation. If that leaves
/// fewer than ten lines the input is returned as is. The flag reports
/// whether the filtered version was used.
pub fn filter_unsupported_lines(document: &str, conversation: &str) -> (String, bool) {
    let conversation = conversation.to_lowercase();

    let kept: Vec<&str> = document
        .lines()
        .filter(|line| {
            if line.starts_with('#') {
                return true;
            }
            if line.trim().is_empty() {
                return false;
            }
            let lower = line.to_lowercase();
            let words: Vec<&str> = lower.split_whitespace().collect();
            words.len() < SHORT_LINE_WORDS
                || words
                    .iter()
                    .any(|w| w.chars().count() > EVIDENCE_WORD_LEN && conversation.contains(w))
        })
        .collect();

    if kept.len() < MIN_FILTERED_LINES {
        (document.to_string(), false)
    } else {
        (kept.join("\n"), true)
    }
}

/// Build a document straight from the transcript.
///
/// A question mentioning a section keyword opens that section; answers go
/// under the most recently opened one. Answers before the first section are
/// dropped.
pub fn fallback_document(state: &InterviewState) -> String {
    let topic = state.topic().unwrap_or(UNTITLED);
    let mut document = format!("# Process: {}\n", topic);
    let mut current: Option<&str> = None;

    for interaction in state.transcript() {
        let question = interaction.question.to_lowercase();
        let section = FALLBACK_SECTIONS
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| question.contains(k)))
            .map(|(_, heading)| *heading);

        if let Some(heading) = section {
            if current != Some(heading) {
                document.push_str(&format!("\n{}\n", heading));
                current = Some(heading);
            }
        }

        let answer = interaction.answer.trim();
        if current.is_some() && !answer.is_empty() {
            document.push_str(&format!("- {}\n", answer));
        }
    }

    document
}

/// Compiles the transcript into a Markdown process document
pub struct DocumentExtractor<'a> {
    client: &'a dyn CompletionClient,
}

impl<'a> DocumentExtractor<'a> {
    pub fn new(client: &'a dyn CompletionClient) -> Self {
        Self { client }
    }

    pub async fn extract_process(&self, state: &InterviewState) -> ProcessDocument {
        let topic = state.topic().unwrap_or(UNTITLED);
        let conversation = state.get_conversation_text();
        let prompt = InterviewPrompts::build_extraction_prompt(topic, &conversation);

        match self
            .client
            .complete(&prompt, Some(InterviewPrompts::extractor_system()))
            .await
        {
            Ok(draft) if !draft.trim().is_empty() => {
                let titled = ensure_heading(draft.trim(), topic);
                let (markdown, filtered) = filter_unsupported_lines(&titled, &conversation);
                debug!(filtered, lines = markdown.lines().count(), "Document drafted by backend");
                return ProcessDocument {
                    markdown,
                    source: DocumentSource::Backend,
                    filtered,
                };
            }
            Ok(_) => warn!("Backend returned an empty document, building from transcript"),
            Err(e) => warn!(error = %e, "Document extraction failed, building from transcript"),
        }

        ProcessDocument {
            markdown: fallback_document(state),
            source: DocumentSource::Fallback,
            filtered: false,
        }
    }
}
