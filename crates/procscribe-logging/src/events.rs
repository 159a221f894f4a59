use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Interview stage that had to fall back to built-in behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Question,
    Validation,
    Extraction,
    StateLoad,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Question => write!(f, "question"),
            Stage::Validation => write!(f, "validation"),
            Stage::Extraction => write!(f, "extraction"),
            Stage::StateLoad => write!(f, "state-load"),
        }
    }
}

/// Structured log events for an interview session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    InterviewStarted {
        topic: String,
        backend: String,
    },
    StateRestored {
        path: PathBuf,
        interactions: usize,
    },
    QuestionAsked {
        number: usize,
        aspect: Option<String>,
        source: String,
    },
    AnswerAccepted {
        number: usize,
        complete: bool,
    },
    AnswerRejected {
        number: usize,
        reason: String,
    },
    BackendFallback {
        stage: Stage,
        detail: String,
    },
    StateSaved {
        path: PathBuf,
    },
    InterviewCompleted {
        interactions: usize,
        aspects_covered: usize,
        duration_secs: f64,
    },
    InterviewEnded {
        reason: String,
        interactions: usize,
    },
    DocumentExtracted {
        lines: usize,
        from_backend: bool,
        filtered: bool,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors and visual structure
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for interview events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::InterviewStarted { topic, backend } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╭─────────────────────────────────────────────────────────────────────╮"
                        .bright_blue()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {}{}",
                    "│".bright_blue(),
                    "procscribe".bold().bright_white(),
                    " ".repeat(57) + &"│".bright_blue().to_string()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Topic:".dimmed(),
                    Self::truncate_with_padding(topic, 60, 67).dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Backend:".dimmed(),
                    Self::truncate_with_padding(backend, 58, 65).dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╰─────────────────────────────────────────────────────────────────────╯"
                        .bright_blue()
                );
                let _ = writeln!(stderr, "  Type 'exit' at any time to end the interview early.");
                let _ = writeln!(stderr);
            }
            LogEvent::StateRestored { path, interactions } => {
                let _ = writeln!(
                    stderr,
                    "{} Resumed {} interaction(s) from {}",
                    "->".dimmed(),
                    interactions,
                    path.display()
                );
            }
            LogEvent::BackendFallback { stage, detail } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} {}",
                    "⚠".bright_yellow(),
                    format!("[{}]", stage).yellow(),
                    detail.dimmed()
                );
            }
            LogEvent::StateSaved { path } => {
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "✓".bright_green(),
                    format!("Progress saved to {}", path.display()).dimmed()
                );
            }
            LogEvent::InterviewCompleted {
                interactions,
                aspects_covered,
                duration_secs,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{} Interview complete: {} interactions, {} aspects covered ({:.0}s)",
                    "✓".bright_green(),
                    interactions,
                    aspects_covered,
                    duration_secs
                );
            }
            LogEvent::InterviewEnded {
                reason,
                interactions,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{} Interview ended ({}) after {} interaction(s)",
                    "■".bright_yellow(),
                    reason,
                    interactions
                );
            }
            LogEvent::DocumentExtracted {
                lines,
                from_backend,
                ..
            } => {
                let origin = if *from_backend {
                    "generated".bright_green()
                } else {
                    "built from transcript".bright_yellow()
                };
                let _ = writeln!(
                    stderr,
                    "{} Document {} ({} lines)",
                    "📄".dimmed(),
                    origin,
                    lines
                );
            }
            LogEvent::QuestionAsked { .. }
            | LogEvent::AnswerAccepted { .. }
            | LogEvent::AnswerRejected { .. } => {
                // The conversation itself is already on screen
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::InterviewStarted { topic, backend } => {
                format!("[{}] interview:start backend={} topic={}", timestamp, backend, topic)
            }
            LogEvent::StateRestored { interactions, .. } => {
                format!("[{}] state:restored:{}", timestamp, interactions)
            }
            LogEvent::QuestionAsked {
                number,
                aspect,
                source,
            } => format!(
                "[{}] question:{} aspect={} source={}",
                timestamp,
                number,
                aspect.as_deref().unwrap_or("-"),
                source
            ),
            LogEvent::AnswerAccepted { number, complete } => {
                format!("[{}] answer:ok:{} complete={}", timestamp, number, complete)
            }
            LogEvent::AnswerRejected { number, reason } => {
                format!("[{}] answer:rejected:{} {}", timestamp, number, reason)
            }
            LogEvent::BackendFallback { stage, detail } => {
                format!("[{}] fallback:{} {}", timestamp, stage, detail)
            }
            LogEvent::StateSaved { path } => {
                format!("[{}] state:saved {}", timestamp, path.display())
            }
            LogEvent::InterviewCompleted {
                interactions,
                duration_secs,
                ..
            } => format!(
                "[{}] interview:done:{} {:.1}s",
                timestamp, interactions, duration_secs
            ),
            LogEvent::InterviewEnded {
                reason,
                interactions,
            } => format!("[{}] interview:end:{} {}", timestamp, interactions, reason),
            LogEvent::DocumentExtracted {
                lines,
                from_backend,
                filtered,
            } => format!(
                "[{}] document:{} lines backend={} filtered={}",
                timestamp, lines, from_backend, filtered
            ),
        };
        let _ = writeln!(stderr, "{}", msg);
    }

    /// Truncate a string and pad to exact width
    fn truncate_with_padding(s: &str, max_len: usize, total_width: usize) -> String {
        let truncated = if s.chars().count() > max_len {
            let head: String = s.chars().take(max_len - 3).collect();
            format!("{}...", head)
        } else {
            s.to_string()
        };

        let padding_needed = total_width.saturating_sub(truncated.chars().count() + 1);
        format!("{}{}│", truncated, " ".repeat(padding_needed))
    }
}
