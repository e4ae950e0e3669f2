use crate::error::{MigrationError, MigrationResult};
use crate::prompt::{CancelType, Prompter};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};

/// Interactive [`Prompter`] backed by `rustyline`, used whenever the
/// deduplicator or rename resolver needs a human decision and `--quiet`
/// hasn't forced a scripted/non-interactive run.
pub struct LineEditor(Editor<(), DefaultHistory>);

impl LineEditor {
    pub fn new() -> MigrationResult<Self> {
        let config = Config::builder().auto_add_history(true).build();
        let editor = Editor::with_config(config).map_err(MigrationError::Prompt)?;
        Ok(Self(editor))
    }
}

impl Prompter for LineEditor {
    fn prompt(&mut self, message: &str) -> MigrationResult<String> {
        loop {
            match self.0.readline(&format!("{message} ")) {
                Ok(line) => {
                    let trimmed = line.trim();
                    return match trimmed {
                        "exit" => Err(CancelType::Exit.into()),
                        _ => Ok(trimmed.to_owned()),
                    };
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    return Err(CancelType::Exit.into());
                }
                Err(err) => return Err(MigrationError::Prompt(err)),
            }
        }
    }

    fn confirm(&mut self, message: &str) -> MigrationResult<bool> {
        loop {
            let answer = self.prompt(&format!("{message} [y/n]"))?;
            match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => println!("Please answer y or n."),
            }
        }
    }
}
