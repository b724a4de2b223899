// UI layer: interactive prompts using `dialoguer` and a spinner from
// `indicatif` while requests are in flight.
// Commands talk to the terminal only through `Prompter`, so the same flows
// can be driven by scripted answers.

use std::time::Duration;

use dialoguer::{Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{Error, Result};

/// Source of interactive answers.
pub trait Prompter {
    /// Free text answer. Empty answers are returned as-is.
    fn input(&mut self, prompt: &str) -> Result<String>;

    /// Like `input` but without echoing what is typed.
    fn password(&mut self, prompt: &str) -> Result<String>;

    fn confirm(&mut self, prompt: &str) -> Result<bool>;

    /// Index of the chosen item. Callers must still bound-check it.
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize>;
}

/// Prompter backed by the user's terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

fn prompt_error(err: std::io::Error) -> Error {
    Error::io("failed to read input", err)
}

impl Prompter for TerminalPrompter {
    fn input(&mut self, prompt: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)
    }

    fn password(&mut self, prompt: &str) -> Result<String> {
        Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(prompt_error)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(prompt_error)
    }

    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize> {
        Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()
            .map_err(prompt_error)
    }
}

/// Run `work` while a spinner with `message` is shown on stderr. Nothing is
/// drawn when stderr is not a terminal.
pub fn with_spinner<T>(message: &str, work: impl FnOnce() -> Result<T>) -> Result<T> {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = work();
    spinner.finish_and_clear();
    result
}
