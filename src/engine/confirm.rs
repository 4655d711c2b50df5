//! Confirmation capability for destructive operations. Supplied by the CLI; the core never prompts.

use colored::Colorize;
use std::io::{self, BufRead, Write};

pub trait Confirm {
    /// Show `prompt` and return the answer line, or `None` when nothing could be read.
    fn ask(&self, prompt: &str) -> Option<String>;

    /// Show `prompt` and return whether the operator agreed.
    fn confirm(&self, prompt: &str) -> bool {
        self.ask(prompt).is_some_and(|answer| is_affirmative(&answer))
    }
}

/// `y` / `yes`, any case.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// `n` / `no`, any case.
pub fn is_negative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "n" | "no")
}

/// Reads one line from stdin per question. Unreadable input counts as "no".
pub struct ConsoleConfirm;

impl Confirm for ConsoleConfirm {
    fn ask(&self, prompt: &str) -> Option<String> {
        let label = format!("[{}]", env!("CARGO_PKG_NAME")).cyan().bold();
        eprint!("{} {}", label, prompt);
        let _ = io::stderr().flush();
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(answer.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

/// Used with `--force`: every question is answered yes.
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn ask(&self, _prompt: &str) -> Option<String> {
        Some("yes".to_string())
    }

    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}
