use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use procscribe_llm::CompletionClient;
use procscribe_logging::{LogEvent, Logger, Stage};
use procscribe_state::{InterviewState, StateError};
use procscribe_validator::AnswerValidator;

use crate::context::{InterviewContext, InterviewSettings};
use crate::error::InterviewError;
use crate::extractor::{document_file_name, DocumentExtractor, DocumentSource};
use crate::outcome::{InterviewOutcome, InterviewSummary};
use crate::questions::{QuestionGenerator, QuestionSource, OPENING_QUESTION};
use crate::terminal::{is_exit_command, Terminal};

const INTERVIEWER: &str = "Interviewer";
const USER_PROMPT: &str = "You";
const THANK_YOU: &str = "Thank you, I have enough information to document this process.";

/// How the question loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ending {
    Completed,
    UserEnded,
    QuestionLimitReached,
}

impl Ending {
    fn describe(self) -> &'static str {
        match self {
            Ending::Completed => "completed",
            Ending::UserEnded => "ended by user",
            Ending::QuestionLimitReached => "question limit reached",
        }
    }
}

enum Reply {
    Answer(String),
    End,
}

/// Drives one interview from topic to saved document
pub struct InterviewRunner<'a> {
    client: &'a dyn CompletionClient,
    terminal: &'a mut dyn Terminal,
    logger: Arc<Logger>,
    settings: InterviewSettings,
    interrupted: Arc<AtomicBool>,
}

impl<'a> InterviewRunner<'a> {
    pub fn new(
        client: &'a dyn CompletionClient,
        terminal: &'a mut dyn Terminal,
        logger: Arc<Logger>,
        settings: InterviewSettings,
    ) -> Self {
        Self {
            client,
            terminal,
            logger,
            settings,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a handle to signal interruption
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    /// Run the interview, then compile and offer to save the document
    pub async fn run(&mut self) -> Result<InterviewOutcome, InterviewError> {
        let state = match self.prepare_state() {
            Ok(state) => state,
            Err(InterviewError::Interrupted) => InterviewState::new(),
            Err(e) => return Err(e),
        };
        let mut context = InterviewContext::new(state, self.settings.max_questions);

        let result = match self.interview(&mut context).await {
            Ok(ending) => self.wrap_up(&context, ending).await,
            Err(e) => Err(e),
        };
        match result {
            Err(InterviewError::Interrupted) => Ok(self.handle_interrupt(&context)),
            other => other,
        }
    }

    /// Start fresh, or restore the saved state when asked to
    fn prepare_state(&mut self) -> Result<InterviewState, InterviewError> {
        let mut state = InterviewState::new();
        let path = self.settings.state_path.clone();
        if !path.exists() {
            return Ok(state);
        }

        let load =
            self.settings.resume || self.read_confirm("Found a previous interview state. Load it?")?;
        if !load {
            return Ok(state);
        }

        match state.restore_from(&path) {
            Ok(()) => {
                self.logger.log(&LogEvent::StateRestored {
                    path: path.clone(),
                    interactions: state.transcript().len(),
                });
                self.terminal.say(&format!(
                    "Loaded previous state for: {}",
                    state.topic().unwrap_or("(no topic yet)")
                ));
            }
            Err(e) => {
                warn!(error = %e, "Could not restore saved state");
                self.logger.log(&LogEvent::BackendFallback {
                    stage: Stage::StateLoad,
                    detail: e.to_string(),
                });
                self.terminal
                    .say("Could not load the previous state. Starting a new interview.");
            }
        }
        Ok(state)
    }

    async fn interview(&mut self, context: &mut InterviewContext) -> Result<Ending, InterviewError> {
        self.check_interrupt()?;
        if !self.ask_topic(context)? {
            return Ok(Ending::UserEnded);
        }

        self.logger.log(&LogEvent::InterviewStarted {
            topic: context.state.topic().unwrap_or_default().to_string(),
            backend: self.client.name().to_string(),
        });

        let generator = QuestionGenerator::new(self.client);
        let mut validator = AnswerValidator::new(self.client);

        loop {
            self.check_interrupt()?;

            if context.state.is_complete() {
                return Ok(Ending::Completed);
            }
            if !context.should_continue() {
                info!(limit = self.settings.max_questions, "Question limit reached");
                return Ok(Ending::QuestionLimitReached);
            }

            let question = generator.generate_question(&context.state).await;
            if question.is_closing() {
                context.state.mark_complete();
                self.terminal
                    .say(&format!("{}: {}", INTERVIEWER, question.text));
                return Ok(Ending::Completed);
            }
            if question.source == QuestionSource::Fallback {
                self.logger.log(&LogEvent::BackendFallback {
                    stage: Stage::Question,
                    detail: format!(
                        "using built-in question for {}",
                        question.aspect.map(|a| a.label()).unwrap_or("the process")
                    ),
                });
            }

            let number = context.questions_answered + 1;
            self.logger.log(&LogEvent::QuestionAsked {
                number,
                aspect: question.aspect.map(|a| a.to_string()),
                source: question.source.to_string(),
            });
            self.terminal
                .say(&format!("{}: {}", INTERVIEWER, question.text));

            let answer = match self.read_reply()? {
                Reply::Answer(answer) => answer,
                Reply::End => {
                    self.terminal.say("Interview ended by user.");
                    return Ok(Ending::UserEnded);
                }
            };

            let verdict = validator
                .validate_answer(&mut context.state, &question.text, &answer)
                .await;
            if verdict.used_fallback {
                self.logger.log(&LogEvent::BackendFallback {
                    stage: Stage::Validation,
                    detail: "answer judged with rule-based checks".to_string(),
                });
            }
            if !verdict.is_valid {
                self.logger.log(&LogEvent::AnswerRejected {
                    number,
                    reason: verdict.reason.clone(),
                });
                self.terminal.say(&format!("Validation: {}", verdict.reason));
                continue;
            }

            context.state.add_interaction(&question.text, &answer);
            context.record_answer();
            self.logger.log(&LogEvent::AnswerAccepted {
                number,
                complete: verdict.is_complete,
            });

            if context.autosave_due(self.settings.autosave_every) {
                self.autosave(&context.state);
            }

            if verdict.is_complete {
                context.state.mark_complete();
                self.terminal.say(&format!("{}: {}", INTERVIEWER, THANK_YOU));
                return Ok(Ending::Completed);
            }
        }
    }

    /// Ask for the topic until a non-empty one is given.
    ///
    /// Returns false when the user ends the session instead.
    fn ask_topic(&mut self, context: &mut InterviewContext) -> Result<bool, InterviewError> {
        if context.state.topic().is_some() {
            return Ok(true);
        }

        loop {
            self.terminal
                .say(&format!("{}: {}", INTERVIEWER, OPENING_QUESTION));
            let topic = match self.read_reply()? {
                Reply::Answer(topic) => topic,
                Reply::End => return Ok(false),
            };

            match context.state.set_topic(&topic) {
                Ok(()) => {
                    context.state.add_interaction(OPENING_QUESTION, &topic);
                    return Ok(true);
                }
                Err(StateError::EmptyTopic) => {
                    self.terminal.say("Process topic cannot be empty.");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn read_reply(&mut self) -> Result<Reply, InterviewError> {
        let input = match self.terminal.ask(USER_PROMPT) {
            Ok(input) => input,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                debug!("Input closed");
                return Ok(Reply::End);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                self.interrupted.store(true, Ordering::SeqCst);
                return Err(InterviewError::Interrupted);
            }
            Err(e) => return Err(e.into()),
        };
        self.check_interrupt()?;

        let input = input.trim();
        if is_exit_command(input) {
            Ok(Reply::End)
        } else {
            Ok(Reply::Answer(input.to_string()))
        }
    }

    /// Yes/no prompt where closed input means no
    fn read_confirm(&mut self, prompt: &str) -> Result<bool, InterviewError> {
        match self.terminal.confirm(prompt) {
            Ok(yes) => Ok(yes),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                debug!(prompt, "Input closed, taking no for an answer");
                Ok(false)
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                self.interrupted.store(true, Ordering::SeqCst);
                Err(InterviewError::Interrupted)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn check_interrupt(&self) -> Result<(), InterviewError> {
        if self.interrupted.load(Ordering::SeqCst) {
            Err(InterviewError::Interrupted)
        } else {
            Ok(())
        }
    }

    /// Save progress; failures are reported but never stop the interview
    fn autosave(&self, state: &InterviewState) {
        let path = &self.settings.state_path;
        match state.save(path) {
            Ok(()) => self.logger.log(&LogEvent::StateSaved { path: path.clone() }),
            Err(e) => warn!(error = %e, "Autosave failed"),
        }
    }

    fn handle_interrupt(&mut self, context: &InterviewContext) -> InterviewOutcome {
        info!("Interview interrupted by user");
        let interactions = context.state.transcript().len();
        self.logger.log(&LogEvent::InterviewEnded {
            reason: "interrupted".to_string(),
            interactions,
        });

        if interactions == 0 {
            return InterviewOutcome::no_transcript(context.total_duration());
        }
        self.terminal.say("Interview interrupted. Saving progress...");
        self.autosave(&context.state);
        InterviewOutcome::Interrupted(self.summarize(context, None))
    }

    async fn wrap_up(
        &mut self,
        context: &InterviewContext,
        ending: Ending,
    ) -> Result<InterviewOutcome, InterviewError> {
        let state = &context.state;
        let interactions = state.transcript().len();

        match ending {
            Ending::Completed => self.logger.log(&LogEvent::InterviewCompleted {
                interactions,
                aspects_covered: state.covered_aspects().len(),
                duration_secs: context.total_duration().as_secs_f64(),
            }),
            _ => self.logger.log(&LogEvent::InterviewEnded {
                reason: ending.describe().to_string(),
                interactions,
            }),
        }

        if interactions == 0 {
            self.terminal.say("No conversation history to process.");
            return Ok(InterviewOutcome::no_transcript(context.total_duration()));
        }

        self.terminal.say("");
        self.terminal.say("Extracting the process...");
        self.print_conversation(state);

        let extractor = DocumentExtractor::new(self.client);
        let document = extractor.extract_process(state).await;
        if document.source == DocumentSource::Fallback {
            self.logger.log(&LogEvent::BackendFallback {
                stage: Stage::Extraction,
                detail: "document built from the transcript".to_string(),
            });
        }
        self.logger.log(&LogEvent::DocumentExtracted {
            lines: document.line_count(),
            from_backend: document.source == DocumentSource::Backend,
            filtered: document.filtered,
        });

        let rule = "=".repeat(60);
        self.terminal.say("");
        self.terminal.say(&rule);
        self.terminal.say("FINAL PROCESS DOCUMENT");
        self.terminal.say(&rule);
        for line in document.markdown.lines() {
            self.terminal.say(line);
        }
        self.terminal.say(&rule);

        let mut document_path = None;
        if self.read_confirm("Would you like to save this document?")? {
            let path = self
                .settings
                .output_dir
                .join(document_file_name(state.topic().unwrap_or_default()));
            std::fs::create_dir_all(&self.settings.output_dir)
                .and_then(|()| std::fs::write(&path, &document.markdown))
                .map_err(|source| InterviewError::WriteDocument {
                    path: path.clone(),
                    source,
                })?;
            self.terminal
                .say(&format!("Document saved as {}", path.display()));
            document_path = Some(path);
        }

        if self.read_confirm("Would you like to save the interview state for later?")? {
            state.save(&self.settings.state_path)?;
            self.logger.log(&LogEvent::StateSaved {
                path: self.settings.state_path.clone(),
            });
            self.terminal.say("Interview state saved.");
        }

        let summary = self.summarize(context, document_path);
        Ok(match ending {
            Ending::Completed => InterviewOutcome::Completed(summary),
            Ending::UserEnded => InterviewOutcome::UserEnded(summary),
            Ending::QuestionLimitReached => InterviewOutcome::QuestionLimitReached(summary),
        })
    }

    /// Echo every answered question after the opening one
    fn print_conversation(&mut self, state: &InterviewState) {
        self.terminal.say("");
        self.terminal.say("Conversation Summary:");
        for (i, interaction) in state.transcript().iter().enumerate().skip(1) {
            self.terminal
                .say(&format!("{}. Q: {}", i, interaction.question));
            self.terminal
                .say(&format!("   A: {}", interaction.answer));
        }
    }

    fn summarize(
        &self,
        context: &InterviewContext,
        document_path: Option<std::path::PathBuf>,
    ) -> InterviewSummary {
        let state = &context.state;
        InterviewSummary {
            topic: state.topic().map(str::to_string),
            interactions: state.transcript().len(),
            aspects_covered: state.covered_aspects().len(),
            validation_errors: state.validation_error_count(),
            document_path,
            total_duration_secs: context.total_duration().as_secs_f64(),
        }
    }
}
