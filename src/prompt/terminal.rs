//! Terminal prompts backed by `dialoguer`.
//!
//! Selection and confirmation prompts can be dismissed (Esc / `q`). A
//! dismissed prompt asks whether the whole run should be cancelled; when the
//! user says no, the original question is asked again. The loop is bounded:
//! after [`MAX_DISMISSALS`] dismissals the run is cancelled.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect, Password, Select};
use log::debug;

use super::prompter::Prompter;
use crate::error_handling::types::PromptError;

pub const MAX_DISMISSALS: usize = 3;

pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    /// Runs `question` until it yields an answer or the user confirms cancellation.
    fn ask<T, Q>(&self, mut question: Q) -> Result<T, PromptError>
    where
        Q: FnMut() -> dialoguer::Result<Option<T>>,
    {
        for _ in 0..MAX_DISMISSALS {
            match question().map_err(terminal_error)? {
                Some(answer) => return Ok(answer),
                None => {
                    if self.wants_to_cancel()? {
                        return Err(PromptError::Cancelled);
                    }
                    debug!("Prompt dismissed, asking again");
                }
            }
        }
        Err(PromptError::Cancelled)
    }

    fn wants_to_cancel(&self) -> Result<bool, PromptError> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt("Do you want cancel script")
            .default(false)
            .interact_opt()
            .map_err(terminal_error)?;
        // dismissing this question too counts as a yes
        Ok(answer.unwrap_or(true))
    }
}

fn terminal_error(err: dialoguer::Error) -> PromptError {
    PromptError::Terminal(err.to_string())
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError> {
        self.ask(|| {
            Confirm::with_theme(&self.theme)
                .with_prompt(message)
                .default(default)
                .interact_opt()
        })
    }

    fn choose(&self, message: &str, choices: &[String]) -> Result<usize, PromptError> {
        self.ask(|| {
            Select::with_theme(&self.theme)
                .with_prompt(message)
                .items(choices)
                .default(0)
                .interact_opt()
        })
    }

    fn checkbox(&self, message: &str, choices: &[String]) -> Result<Vec<usize>, PromptError> {
        self.ask(|| {
            MultiSelect::with_theme(&self.theme)
                .with_prompt(message)
                .items(choices)
                .interact_opt()
        })
    }

    fn input_text(&self, message: &str) -> Result<String, PromptError> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()
            .map(|s| s.trim().to_string())
            .map_err(terminal_error)
    }

    fn password(&self, message: &str) -> Result<String, PromptError> {
        Password::with_theme(&self.theme)
            .with_prompt(message)
            .allow_empty_password(true)
            .interact()
            .map_err(terminal_error)
    }
}
