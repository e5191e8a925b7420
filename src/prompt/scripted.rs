//! Prompter that replays canned answers, for tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use super::prompter::Prompter;
use crate::error_handling::types::PromptError;

#[derive(Debug, Clone)]
pub enum Answer {
    Yes,
    No,
    Pick(usize),
    PickMany(Vec<usize>),
    Text(String),
    Cancel,
}

#[derive(Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<Answer>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: RefCell::new(answers.into()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Questions asked so far, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    pub fn is_exhausted(&self) -> bool {
        self.answers.borrow().is_empty()
    }

    fn next(&self, message: &str) -> Result<Answer, PromptError> {
        self.asked.borrow_mut().push(message.to_string());
        match self.answers.borrow_mut().pop_front() {
            Some(Answer::Cancel) => Err(PromptError::Cancelled),
            Some(answer) => Ok(answer),
            None => panic!("no scripted answer left for prompt: {}", message),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, message: &str, _default: bool) -> Result<bool, PromptError> {
        match self.next(message)? {
            Answer::Yes => Ok(true),
            Answer::No => Ok(false),
            other => panic!("expected yes/no for '{}', got {:?}", message, other),
        }
    }

    fn choose(&self, message: &str, choices: &[String]) -> Result<usize, PromptError> {
        match self.next(message)? {
            Answer::Pick(i) if i < choices.len() => Ok(i),
            other => panic!("expected a valid pick for '{}', got {:?}", message, other),
        }
    }

    fn checkbox(&self, message: &str, _choices: &[String]) -> Result<Vec<usize>, PromptError> {
        match self.next(message)? {
            Answer::PickMany(v) => Ok(v),
            other => panic!("expected picks for '{}', got {:?}", message, other),
        }
    }

    fn input_text(&self, message: &str) -> Result<String, PromptError> {
        match self.next(message)? {
            Answer::Text(t) => Ok(t),
            other => panic!("expected text for '{}', got {:?}", message, other),
        }
    }

    fn password(&self, message: &str) -> Result<String, PromptError> {
        self.input_text(message)
    }
}
