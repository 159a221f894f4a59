//! Interactive terminal backed by dialoguer.

use std::io::{self, BufRead, IsTerminal, Write};

use colored::Colorize;
use dialoguer::{Confirm, Input};

use procscribe_core::Terminal;

/// Talks to the user on stdout/stdin
pub struct ConsoleTerminal;

fn to_io(err: dialoguer::Error) -> io::Error {
    match err {
        dialoguer::Error::IO(e) => e,
    }
}

impl Terminal for ConsoleTerminal {
    fn say(&mut self, line: &str) {
        match line.split_once(": ") {
            Some(("Interviewer", rest)) => {
                println!("{} {}", "Interviewer:".bright_cyan().bold(), rest)
            }
            Some(("Validation", rest)) => {
                println!("{} {}", "✗".bright_red(), rest.yellow())
            }
            _ if line.starts_with("# ") || line.starts_with("## ") => {
                println!("{}", line.bold())
            }
            _ => println!("{}", line),
        }
    }

    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        // Piped input: read plain lines so end of input is visible
        if !io::stdin().is_terminal() {
            print!("{}: ", prompt.bright_green());
            io::stdout().flush()?;
            let mut line = String::new();
            if io::stdin().lock().read_line(&mut line)? == 0 {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
            }
            return Ok(line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string());
        }

        Input::<String>::new()
            .with_prompt(prompt.bright_green().to_string())
            .allow_empty(true)
            .interact_text()
            .map_err(to_io)
    }

    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        if !io::stdin().is_terminal() {
            let answer = self.ask(&format!("{} (y/n)", prompt))?;
            return Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"));
        }

        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(to_io)
    }
}
