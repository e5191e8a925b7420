//! Interactive prompts.
//!
//! Components never talk to the terminal directly: they receive a
//! [`Prompter`], which is a [`TerminalPrompter`] in the binary and a scripted
//! double in tests.

pub mod prompter;
#[cfg(test)]
pub mod scripted;
pub mod terminal;

pub use prompter::{password_with, Prompter};
pub use terminal::TerminalPrompter;
