//! Interactive initialization for procscribe.
//!
//! Sets up the global config file with a user-selected backend.

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Select;
use std::fs;

use procscribe_llm::{create_client, BackendType, ClientConfig, CompletionError};

use crate::config::{GlobalConfig, GLOBAL_CONFIG_DIR, GLOBAL_CONFIG_FILE};

/// Backend info for display and config
struct BackendInfo {
    display_name: &'static str,
    backend: BackendType,
    hint: &'static str,
}

const BACKENDS: &[BackendInfo] = &[
    BackendInfo {
        display_name: "OpenRouter",
        backend: BackendType::OpenRouter,
        hint: "export OPENROUTER_API_KEY=...",
    },
    BackendInfo {
        display_name: "Ollama",
        backend: BackendType::Ollama,
        hint: "https://ollama.com/download, then `ollama pull phi3:mini`",
    },
    BackendInfo {
        display_name: "Offline (built-in questions only)",
        backend: BackendType::Offline,
        hint: "",
    },
];

pub async fn handle_init() -> Result<()> {
    eprintln!("{}", "Setting up procscribe...".bold());
    eprintln!();

    // Step 1: Detect reachable backends
    eprintln!("{}", "Checking for available backends...".dimmed());

    let mut available: Vec<&BackendInfo> = Vec::new();

    for info in BACKENDS {
        let reachable = match create_client(info.backend, &ClientConfig::default()) {
            Ok(client) => client.is_available().await,
            Err(CompletionError::MissingApiKey(_)) => false,
            Err(e) => {
                tracing::debug!(error = %e, backend = %info.backend, "Backend setup failed");
                false
            }
        };

        if reachable {
            eprintln!(
                "  {} {} ({})",
                "✓".bright_green(),
                info.display_name,
                info.backend
            );
            available.push(info);
        } else {
            eprintln!(
                "  {} {} (not reachable: {})",
                "✗".dimmed(),
                info.display_name,
                info.hint.dimmed()
            );
        }
    }

    eprintln!();

    // Offline always works, so there is at least one choice
    let selection = if available.len() == 1 {
        eprintln!(
            "Using {} as your default backend (only one available).",
            available[0].display_name.bright_cyan()
        );
        0
    } else {
        let items: Vec<&str> = available.iter().map(|b| b.display_name).collect();
        Select::new()
            .with_prompt("Select your default backend")
            .items(&items)
            .default(0)
            .interact()?
    };

    let backend_info = available[selection];

    // Step 2: Write global config
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join(GLOBAL_CONFIG_DIR);

    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;

    let config_path = config_dir.join(GLOBAL_CONFIG_FILE);

    let config_content = render_global_config(backend_info.backend);

    if config_path.exists() {
        eprintln!(
            "{} Config already exists at {}",
            "⚠".bright_yellow(),
            config_path.display()
        );

        let overwrite = Select::new()
            .with_prompt("Overwrite existing config?")
            .items(&["No, keep existing", "Yes, replace it"])
            .default(0)
            .interact()?;

        if overwrite == 0 {
            eprintln!();
            eprintln!("Keeping existing config. Edit it manually if needed:");
            eprintln!("  {}", config_path.display().to_string().dimmed());
            return Ok(());
        }
    }

    fs::write(&config_path, &config_content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    eprintln!();
    eprintln!(
        "{} Config saved to {}",
        "✓".bright_green(),
        config_path.display()
    );

    print_getting_started();

    Ok(())
}

/// Global config with `backend` set and the other keys commented out
fn render_global_config(backend: BackendType) -> String {
    format!(
        r#"[defaults]
backend = "{}"
# model = ""            # Optional: backend model name
# base_url = ""         # Optional: override the backend URL
# api_key_env = "OPENROUTER_API_KEY"
# timeout_secs = 60
# max_questions = 20
# autosave_every = 3
# state_file = "interview_state.json"
# output_dir = "."
# log_level = "warn"
"#,
        backend
    )
}

/// Print the getting started guide
pub fn print_getting_started() {
    eprintln!();
    eprintln!("{}", "Getting started:".bold());
    eprintln!(
        "  {} Run: {}",
        "1.".dimmed(),
        "procscribe".bright_cyan()
    );
    eprintln!(
        "  {} Describe the process you want documented and answer the questions",
        "2.".dimmed()
    );
    eprintln!(
        "  {} Type {} to stop early; progress can be resumed with {}",
        "3.".dimmed(),
        "exit".bright_cyan(),
        "procscribe --resume".bright_cyan()
    );
    eprintln!(
        "  {} Inspect saved progress: {}",
        "4.".dimmed(),
        "procscribe show-state".bright_cyan()
    );
}

/// Check if this appears to be first run (no global config)
pub fn is_first_run() -> bool {
    !GlobalConfig::exists()
}
