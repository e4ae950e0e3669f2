pub mod editor;
pub mod scripted;

use crate::error::MigrationResult;
use thiserror::Error;

pub use editor::LineEditor;
pub use scripted::ScriptedPrompter;

/// The narrow interactive interface the core depends on (Design Notes
/// "Interactive prompting"): a line prompt and a yes/no confirmation. Kept
/// this small so the Deduplicator and Rename Resolver are unit-testable by
/// injecting [`ScriptedPrompter`] instead of a real terminal.
pub trait Prompter {
    fn prompt(&mut self, message: &str) -> MigrationResult<String>;
    fn confirm(&mut self, message: &str) -> MigrationResult<bool>;
}

#[derive(Debug, Clone, Copy, Error)]
pub enum CancelType {
    #[error("user declined to resolve the prompt")]
    Stop,
    #[error("user exited the program")]
    Exit,
}
