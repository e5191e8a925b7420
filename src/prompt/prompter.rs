use log::error;

use crate::error_handling::types::PromptError;

/// Interactive questions asked during a run.
///
/// Implementations return [`PromptError::Cancelled`] once the user has
/// confirmed they want to abandon the run; every other outcome is an answer.
pub trait Prompter {
    /// Yes/no question.
    fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError>;

    /// Single choice. Returns the index of the chosen item.
    fn choose(&self, message: &str, choices: &[String]) -> Result<usize, PromptError>;

    /// Multiple choice. Returns the indices of the chosen items, in list order.
    fn checkbox(&self, message: &str, choices: &[String]) -> Result<Vec<usize>, PromptError>;

    /// Free text. May be empty.
    fn input_text(&self, message: &str) -> Result<String, PromptError>;

    /// Masked input.
    fn password(&self, message: &str) -> Result<String, PromptError>;
}

/// Asks for a password until `validate` accepts it, at most `attempts` times.
///
/// `validate` returns the message shown to the user on rejection.
pub fn password_with<P, F>(
    prompter: &P,
    message: &str,
    attempts: usize,
    mut validate: F,
) -> Result<String, PromptError>
where
    P: Prompter + ?Sized,
    F: FnMut(&str) -> Result<(), String>,
{
    for _ in 0..attempts {
        let candidate = prompter.password(message)?;
        match validate(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(reason) => error!("{}", reason),
        }
    }
    Err(PromptError::TooManyAttempts(message.to_string()))
}
