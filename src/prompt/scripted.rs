use crate::error::{MigrationError, MigrationResult};
use crate::prompt::{CancelType, Prompter};
use std::collections::VecDeque;

/// A [`Prompter`] that replays a fixed script of answers, used by tests to
/// exercise scenarios S3 and S5 (rename confirmation, ambiguous primary key)
/// deterministically without a terminal.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    responses: VecDeque<String>,
}

impl ScriptedPrompter {
    pub fn new(responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
        }
    }

    fn next_response(&mut self, message: &str) -> MigrationResult<String> {
        self.responses
            .pop_front()
            .ok_or_else(|| MigrationError::from(CancelType::Stop))
            .inspect_err(|_| tracing::error!("scripted prompter ran out of answers for {message:?}"))
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&mut self, message: &str) -> MigrationResult<String> {
        self.next_response(message)
    }

    fn confirm(&mut self, message: &str) -> MigrationResult<bool> {
        let answer = self.next_response(message)?;
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}
