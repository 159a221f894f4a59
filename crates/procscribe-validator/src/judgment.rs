use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Whether an answer addresses the question it was given for
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RelevanceJudgment {
    #[serde(default)]
    pub relevant: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Whether the transcript holds enough for a process document
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompletenessJudgment {
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    reason: Option<String>,
}

const NO_REASON: &str = "No reason provided";

impl RelevanceJudgment {
    pub fn reason(&self) -> &str {
        self.reason.as_deref().unwrap_or(NO_REASON)
    }
}

impl CompletenessJudgment {
    pub fn reason(&self) -> &str {
        self.reason.as_deref().unwrap_or(NO_REASON)
    }
}

#[derive(Error, Debug)]
pub enum JudgmentParseError {
    #[error("No JSON object found in validator output")]
    NoJsonFound,

    #[error("Failed to parse judgment JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),
}

/// Parse a structured judgment out of free-form model output.
///
/// The model is asked for a JSON object but often wraps it in prose or a
/// code fence, so the span from the first `{` to the last `}` is taken and
/// deserialized.
pub fn parse_judgment<T: DeserializeOwned>(output: &str) -> Result<T, JudgmentParseError> {
    debug!(output_len = output.len(), "Parsing validator judgment");

    let fragment = extract_json_fragment(output).ok_or(JudgmentParseError::NoJsonFound)?;
    let judgment = serde_json::from_str(fragment)?;
    Ok(judgment)
}

fn extract_json_fragment(output: &str) -> Option<&str> {
    let start = output.find('{')?;
    let end = output.rfind('}')?;
    if start < end {
        Some(&output[start..=end])
    } else {
        None
    }
}
