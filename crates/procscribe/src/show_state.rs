use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use procscribe_state::{Aspect, InterviewState};

pub fn handle_show_state(path: &Path, json: bool, transcript: bool) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("No saved interview at {}", path.display());
    }
    let state = InterviewState::load(path)
        .with_context(|| format!("Failed to load interview state from {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&state.stats())?);
        return Ok(());
    }

    print_state(&state, transcript);
    Ok(())
}

fn print_state(state: &InterviewState, transcript: bool) {
    let stats = state.stats();

    println!(
        "{} {}",
        "Topic:".bold(),
        stats.topic.as_deref().unwrap_or("(not set)")
    );
    println!(
        "{} {}",
        "Status:".bold(),
        if stats.is_complete {
            "complete".bright_green()
        } else {
            "in progress".bright_yellow()
        }
    );
    println!("{} {}", "Interactions:".bold(), stats.total_interactions);
    println!("{} {}", "Rejected answers:".bold(), stats.validation_errors);
    println!(
        "{} {} ({:.0} min ago)",
        "Started:".bold(),
        state.start_time().format("%Y-%m-%d %H:%M UTC"),
        stats.duration_minutes
    );

    println!();
    println!("{}", "Aspects:".bold());
    for aspect in Aspect::ALL {
        if state.covered_aspects().contains(&aspect) {
            println!("  {} {}", "✓".bright_green(), aspect);
        } else {
            println!("  {} {}", "·".dimmed(), aspect.to_string().dimmed());
        }
    }

    if transcript {
        println!();
        println!("{}", "Transcript:".bold());
        for (i, interaction) in state.transcript().iter().enumerate() {
            println!("{}. {} {}", i + 1, "Q:".dimmed(), interaction.question);
            println!("   {} {}", "A:".dimmed(), interaction.answer);
        }
    }
}
