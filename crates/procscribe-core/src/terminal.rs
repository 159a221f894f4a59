use std::io;

/// Words that end the interview early when typed as an answer
pub const EXIT_COMMANDS: &[&str] = &["exit", "quit", "stop", "end"];

pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    EXIT_COMMANDS.contains(&input.as_str())
}

/// The interview's line-oriented conversation channel.
///
/// `ask` should report end of input as `io::ErrorKind::UnexpectedEof` and a
/// user interrupt as `io::ErrorKind::Interrupted`.
pub trait Terminal {
    /// Show one line to the user
    fn say(&mut self, line: &str);

    /// Read one line of free text
    fn ask(&mut self, prompt: &str) -> io::Result<String>;

    /// Ask a yes/no question
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_commands_are_case_insensitive() {
        for word in ["exit", "QUIT", " Stop ", "End"] {
            assert!(is_exit_command(word), "{word}");
        }
        assert!(!is_exit_command("ending"));
        assert!(!is_exit_command(""));
    }
}
