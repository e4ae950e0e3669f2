//! Rename Resolver (§4.5): pure-interactive, turns add/remove pairs on the
//! same table into `RenameAttribute` operations.

use crate::error::{MigrationError, MigrationResult};
use crate::prompt::Prompter;
use crate::types::Attribute;

const MAX_RENAME_ATTEMPTS: u32 = 3;

/// Resolves `(adding, removing)` into `(adding', removing', renames)`.
pub fn resolve(
    mut adding: Vec<Attribute>,
    removing: Vec<Attribute>,
    prompter: &mut dyn Prompter,
) -> MigrationResult<(Vec<Attribute>, Vec<Attribute>, Vec<(Attribute, Attribute)>)> {
    if removing.is_empty() {
        return Ok((adding, Vec::new(), Vec::new()));
    }

    if let [single_add] = adding.as_slice() {
        if let [single_remove] = removing.as_slice() {
            let message = format!("Are you renaming :{} to :{}?", single_remove.name, single_add.name);
            if prompter.confirm(&message)? {
                return Ok((Vec::new(), Vec::new(), vec![(adding.remove(0), removing.into_iter().next().unwrap())]));
            }
            return Ok((adding, removing, Vec::new()));
        }
    }

    let mut renames = Vec::new();
    let mut still_removing = Vec::new();
    for removed in removing {
        let asking = format!("Are you renaming :{}?", removed.name);
        if prompter.confirm(&asking)? {
            let new_attribute = find_rename_target(&removed, &mut adding, prompter)?;
            renames.push((new_attribute, removed));
        } else {
            still_removing.push(removed);
        }
    }

    Ok((adding, still_removing, renames))
}

fn find_rename_target(removed: &Attribute, adding: &mut Vec<Attribute>, prompter: &mut dyn Prompter) -> MigrationResult<Attribute> {
    for _ in 0..MAX_RENAME_ATTEMPTS {
        let reply = prompter.prompt("What are you renaming it to?")?;
        if let Some(index) = adding.iter().position(|attribute| attribute.name.as_str() == reply.trim()) {
            return Ok(adding.remove(index));
        }
    }
    Err(MigrationError::RenameResolutionFailed {
        attribute: removed.name.clone(),
    })
}
