//! ui::prompts
//!
//! Confirmations.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode,
//! operations requiring user input fail with a clear error message.
//! Callers take a `&dyn Confirm` so tests can answer without a terminal.

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(String),
}

/// Something that can answer a yes/no question.
pub trait Confirm {
    /// Ask `message`; `default` is used when the answer is empty.
    fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError>;
}

/// Asks on the terminal.
#[derive(Debug, Clone, Copy)]
pub struct TerminalConfirm {
    /// Whether prompting is allowed at all.
    pub interactive: bool,
}

impl Confirm for TerminalConfirm {
    fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError> {
        if !self.interactive {
            return Err(PromptError::NotInteractive);
        }

        let hint = if default { "[Y/n]" } else { "[y/N]" };
        eprint!("{} {} ", message, hint);
        io::stderr()
            .flush()
            .map_err(|e| PromptError::IoError(e.to_string()))?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| PromptError::IoError(e.to_string()))?;
        if read == 0 {
            return Err(PromptError::Cancelled);
        }

        Ok(parse_answer(&line).unwrap_or(default))
    }
}

/// Always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&self, _message: &str, _default: bool) -> Result<bool, PromptError> {
        Ok(self.0)
    }
}

/// Interpret a typed answer; `None` for empty or unrecognized input.
fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
