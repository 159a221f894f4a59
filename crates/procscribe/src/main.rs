mod config;
mod console;
mod init;
mod show_state;

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::warn;

use procscribe_core::{InterviewOutcome, InterviewRunner, InterviewSettings};
use procscribe_llm::{
    create_client, BackendType, ClientConfig, CompletionClient, OfflineClient,
};
use procscribe_logging::{init_tracing, LogFormat, Logger};

use config::{GlobalConfig, ProjectConfig, Settings};
use console::ConsoleTerminal;

#[derive(Parser, Debug)]
#[command(
    name = "procscribe",
    about = "Interview someone about a process and write it up as Markdown",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Working directory (default: current directory)
    #[arg(short = 'd', long, global = true)]
    working_dir: Option<PathBuf>,

    /// Completion backend
    #[arg(short, long, value_enum)]
    backend: Option<BackendChoice>,

    /// Model to request from the backend
    #[arg(short, long)]
    model: Option<String>,

    /// Override the backend's base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Maximum answered questions after the topic (default: 20)
    #[arg(short = 'n', long)]
    max_questions: Option<usize>,

    /// Where interview progress is saved (default: ./interview_state.json)
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Directory the process document is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Resume a saved interview without asking
    #[arg(long)]
    resume: bool,

    /// Skip the backend and use built-in questions and checks
    #[arg(long, conflicts_with = "backend")]
    offline: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatChoice,

    /// Diagnostic log level (RUST_LOG overrides)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append interview events as JSON lines to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Output final result as JSON
    #[arg(long)]
    json_output: bool,

    /// Dry run: show resolved settings without interviewing
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pick a default backend and write the global config
    Init,

    /// Show progress stored in a saved interview state
    ShowState {
        /// State file (default: the configured state file)
        path: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Also print every question and answer
        #[arg(long)]
        transcript: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendChoice {
    Openrouter,
    Ollama,
    Offline,
}

impl From<BackendChoice> for BackendType {
    fn from(choice: BackendChoice) -> Self {
        match choice {
            BackendChoice::Openrouter => BackendType::OpenRouter,
            BackendChoice::Ollama => BackendType::Ollama,
            BackendChoice::Offline => BackendType::Offline,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

impl Cli {
    /// Flags that override config files, as a config layer
    fn overrides(&self) -> ProjectConfig {
        let backend = if self.offline {
            Some(BackendType::Offline)
        } else {
            self.backend.map(BackendType::from)
        };

        ProjectConfig {
            backend: backend.map(|b| b.to_string()),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            api_key_env: None,
            timeout_secs: None,
            max_questions: self.max_questions,
            autosave_every: None,
            state_file: self.state_file.clone(),
            output_dir: self.output_dir.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_format: LogFormat = cli.log_format.into();

    // Init runs before config loading so a broken config can be replaced
    if let Some(Commands::Init) = cli.command {
        init_tracing(cli.log_level.as_deref().unwrap_or("warn"), log_format);
        return init::handle_init().await;
    }

    let working_dir = match cli.working_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let project = ProjectConfig::load(&working_dir)?;
    let global = GlobalConfig::load()?;
    let settings = Settings::resolve(
        &cli.overrides(),
        project.as_ref(),
        global.as_ref(),
        &working_dir,
    )?;

    init_tracing(&settings.log_level, log_format);

    if let Some(Commands::ShowState {
        ref path,
        json,
        transcript,
    }) = cli.command
    {
        let path = path
            .as_ref()
            .map(|p| resolve_against(&working_dir, p))
            .unwrap_or_else(|| settings.state_file.clone());
        return show_state::handle_show_state(&path, json, transcript);
    }

    if cli.dry_run {
        print_dry_run(&settings, &working_dir);
        return Ok(());
    }

    if project.is_none() && init::is_first_run() {
        eprintln!(
            "{} No config found; using {}. Run {} to pick a default backend.",
            "ℹ".bright_blue(),
            settings.backend.to_string().bright_cyan(),
            "procscribe init".bright_cyan()
        );
    }

    let logger = match cli.log_file {
        Some(ref path) => Logger::with_file(log_format, &resolve_against(&working_dir, path))
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };

    let client = build_client(&settings).await;

    let interview_settings = InterviewSettings::default()
        .with_max_questions(settings.max_questions)
        .with_autosave_every(settings.autosave_every)
        .with_state_path(settings.state_file.clone())
        .with_output_dir(settings.output_dir.clone())
        .with_resume(cli.resume);

    let mut terminal = ConsoleTerminal;
    let mut runner = InterviewRunner::new(
        client.as_ref(),
        &mut terminal,
        Arc::new(logger),
        interview_settings,
    );

    // Handle Ctrl+C gracefully; a second press exits immediately
    let interrupt_handle = runner.interrupt_handle();
    ctrlc::set_handler(move || {
        if interrupt_handle.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        eprintln!("\nInterrupted. Finishing after the current answer (Ctrl+C again to quit)...");
    })
    .context("Failed to set Ctrl+C handler")?;

    let outcome = runner.run().await.context("Interview failed")?;

    if cli.json_output {
        let json = serde_json::to_string_pretty(&outcome)?;
        println!("{}", json);
    } else {
        print_outcome(&outcome);
    }

    std::process::exit(outcome.exit_code());
}

fn resolve_against(working_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    }
}

/// Create the configured client, degrading to offline when it can't be built
async fn build_client(settings: &Settings) -> Box<dyn CompletionClient> {
    let mut config = ClientConfig::new();
    if let Some(ref model) = settings.model {
        config = config.with_model(model);
    }
    if let Some(ref url) = settings.base_url {
        config = config.with_base_url(url);
    }
    if let Some(ref var) = settings.api_key_env {
        config = config.with_api_key_env(var);
    }
    if let Some(timeout) = settings.timeout {
        config = config.with_timeout(timeout);
    }

    let client = match create_client(settings.backend, &config) {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, backend = %settings.backend, "Falling back to offline mode");
            eprintln!(
                "{} {}. Continuing with built-in questions.",
                "⚠".bright_yellow(),
                e
            );
            return Box::new(OfflineClient::new());
        }
    };

    if settings.backend != BackendType::Offline && !client.is_available().await {
        eprintln!(
            "{} Backend '{}' is not reachable. Built-in fallbacks will be used when it fails.",
            "⚠".bright_yellow(),
            client.name()
        );
    }
    client
}

fn print_dry_run(settings: &Settings, working_dir: &Path) {
    println!("=== Dry Run ===");
    println!("Working dir: {}", working_dir.display());
    println!("Backend: {}", settings.backend);
    println!(
        "Model: {}",
        settings.model.as_deref().unwrap_or("(backend default)")
    );
    if let Some(ref url) = settings.base_url {
        println!("Base URL: {}", url);
    }
    if let Some(timeout) = settings.timeout {
        println!("Request timeout: {}s", timeout.as_secs());
    }
    println!("Max questions: {}", settings.max_questions);
    println!("Autosave every: {}", settings.autosave_every);
    println!("State file: {}", settings.state_file.display());
    println!("Output dir: {}", settings.output_dir.display());
    println!("Log level: {}", settings.log_level);
}

fn print_outcome(outcome: &InterviewOutcome) {
    eprintln!();
    match outcome {
        InterviewOutcome::Completed(summary) => {
            eprintln!("=== COMPLETE ===");
            eprintln!("Interactions: {}", summary.interactions);
            eprintln!("Aspects covered: {}", summary.aspects_covered);
        }
        InterviewOutcome::UserEnded(summary) => {
            eprintln!("=== ENDED ===");
            eprintln!("Stopped after {} interaction(s)", summary.interactions);
        }
        InterviewOutcome::Interrupted(summary) => {
            eprintln!("=== INTERRUPTED ===");
            eprintln!("Progress saved after {} interaction(s)", summary.interactions);
        }
        InterviewOutcome::QuestionLimitReached(summary) => {
            eprintln!("=== INCOMPLETE ===");
            eprintln!("Reached the question limit after {} interaction(s)", summary.interactions);
            eprintln!("The document may be missing details.");
        }
        InterviewOutcome::NoTranscript { .. } => {
            eprintln!("=== NOTHING RECORDED ===");
        }
    }
    if let Some(path) = outcome.summary().and_then(|s| s.document_path.as_ref()) {
        eprintln!("Document: {}", path.display());
    }
    eprintln!("Duration: {:.1}s", outcome.total_duration_secs());
}
