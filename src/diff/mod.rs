//! Differ (§4.4): computes the flat list of primitive operations between one
//! fresh snapshot and its prior version, invoking the Rename Resolver
//! (§4.5, [`rename`]) along the way.

pub mod rename;

use crate::error::MigrationResult;
use crate::prompt::Prompter;
use crate::types::{Attribute, Operation, Snapshot, TableName};

/// Computes the operations needed to go from `existing` (or nothing) to
/// `new`. `existing` is `None` when the Snapshot Store has no prior record
/// for this table.
pub fn diff(new: &Snapshot, existing: Option<&Snapshot>, prompter: &mut dyn Prompter) -> MigrationResult<Vec<Operation>> {
    let mut ops = Vec::new();

    let baseline_attributes: &[Attribute];
    let baseline_identities: &[crate::types::Identity];
    let empty_attributes: Vec<Attribute> = Vec::new();
    let empty_identities: Vec<crate::types::Identity> = Vec::new();

    match existing {
        Some(old) => {
            baseline_attributes = &old.attributes;
            baseline_identities = &old.identities;
        }
        None => {
            ops.push(Operation::CreateTable { table: new.table.clone() });
            baseline_attributes = &empty_attributes;
            baseline_identities = &empty_identities;
        }
    }

    ops.extend(attribute_operations(&new.table, &new.attributes, baseline_attributes, prompter)?);

    for identity in &new.identities {
        if !baseline_identities.iter().any(|old| old.key_set() == identity.key_set()) {
            ops.push(Operation::AddUniqueIndex {
                table: new.table.clone(),
                identity: identity.clone(),
            });
        }
    }
    for identity in baseline_identities {
        if !new.identities.iter().any(|fresh| fresh.key_set() == identity.key_set()) {
            ops.push(Operation::RemoveUniqueIndex {
                table: new.table.clone(),
                identity: identity.clone(),
            });
        }
    }

    Ok(ops)
}

/// §4.4.1: attribute-level operations, in rename / add / alter / remove
/// order.
fn attribute_operations(
    table: &TableName,
    new_attributes: &[Attribute],
    old_attributes: &[Attribute],
    prompter: &mut dyn Prompter,
) -> MigrationResult<Vec<Operation>> {
    let to_add: Vec<Attribute> = new_attributes
        .iter()
        .filter(|attribute| !old_attributes.iter().any(|old| old.name == attribute.name))
        .cloned()
        .collect();
    let to_remove: Vec<Attribute> = old_attributes
        .iter()
        .filter(|attribute| !new_attributes.iter().any(|new| new.name == attribute.name))
        .cloned()
        .collect();
    let to_alter: Vec<(Attribute, Attribute)> = new_attributes
        .iter()
        .filter_map(|new| {
            old_attributes
                .iter()
                .find(|old| old.name == new.name)
                .filter(|old| *old != new)
                .map(|old| (new.clone(), old.clone()))
        })
        .collect();

    let (to_add, to_remove, renames) = rename::resolve(to_add, to_remove, prompter)?;

    let mut ops = Vec::new();

    for (new_attribute, old_attribute) in renames {
        ops.push(Operation::RenameAttribute {
            table: table.clone(),
            old_attribute,
            new_attribute,
        });
    }

    for attribute in to_add {
        if attribute.references.is_none() {
            ops.push(Operation::AddAttribute {
                table: table.clone(),
                attribute,
            });
        } else {
            let bare = attribute.without_references();
            ops.push(Operation::AddAttribute {
                table: table.clone(),
                attribute: bare.clone(),
            });
            ops.push(Operation::AlterAttribute {
                table: table.clone(),
                old_attribute: bare,
                new_attribute: attribute,
            });
        }
    }

    for (new_attribute, old_attribute) in to_alter {
        if new_attribute.references.is_none() {
            ops.push(Operation::AlterAttribute {
                table: table.clone(),
                old_attribute,
                new_attribute,
            });
        } else {
            let bare_new = new_attribute.without_references();
            ops.push(Operation::AlterAttribute {
                table: table.clone(),
                old_attribute,
                new_attribute: bare_new.clone(),
            });
            ops.push(Operation::AlterAttribute {
                table: table.clone(),
                old_attribute: bare_new,
                new_attribute,
            });
        }
    }

    for attribute in to_remove {
        ops.push(Operation::RemoveAttribute {
            table: table.clone(),
            attribute,
        });
    }

    Ok(ops)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use crate::types::{Identity, MigrationType, Reference, RepoId, NO_DEFAULT};

    fn attribute(name: &str, primary_key: bool) -> Attribute {
        Attribute {
            name: name.into(),
            kind: MigrationType::Text,
            default: NO_DEFAULT.to_owned(),
            allow_nil: !primary_key,
            primary_key,
            references: None,
        }
    }

    fn snapshot(table: &str, attributes: Vec<Attribute>, identities: Vec<Identity>) -> Snapshot {
        Snapshot {
            table: TableName::new(table),
            repo: RepoId::new("MyApp.Repo"),
            attributes,
            identities,
            hash: String::new(),
        }
    }

    #[test]
    fn new_table_emits_create_then_attribute_adds() {
        let new = snapshot(
            "posts",
            vec![attribute("id", true), attribute("title", false)],
            vec![],
        );
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        let ops = diff(&new, None, &mut prompter).unwrap();
        assert_eq!(ops.len(), 3);
        assert!(matches!(&ops[0], Operation::CreateTable { table } if table.as_str() == "posts"));
        assert!(matches!(&ops[1], Operation::AddAttribute { attribute, .. } if attribute.name.as_str() == "id"));
        assert!(matches!(&ops[2], Operation::AddAttribute { attribute, .. } if attribute.name.as_str() == "title"));
    }

    #[test]
    fn fk_add_splits_into_bare_add_then_alter() {
        let mut post_id = attribute("post_id", false);
        post_id.references = Some(Reference {
            table: TableName::new("posts"),
            destination_field: "id".into(),
        });
        let new = snapshot("comments", vec![post_id.clone()], vec![]);
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        let ops = diff(&new, None, &mut prompter).unwrap();
        assert_eq!(ops.len(), 3);
        assert!(matches!(&ops[1], Operation::AddAttribute { attribute, .. } if attribute.references.is_none()));
        assert!(matches!(&ops[2], Operation::AlterAttribute { new_attribute, .. } if new_attribute.references.is_some()));
    }

    #[test]
    fn identical_snapshots_yield_no_operations() {
        let attributes = vec![attribute("id", true)];
        let old = snapshot("posts", attributes.clone(), vec![]);
        let new = snapshot("posts", attributes, vec![]);
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        let ops = diff(&new, Some(&old), &mut prompter).unwrap();
        assert!(ops.is_empty());
    }

    #[test]
    fn identity_added_emits_add_unique_index() {
        let old = snapshot("users", vec![attribute("id", true), attribute("email", false)], vec![]);
        let new = snapshot(
            "users",
            vec![attribute("id", true), attribute("email", false)],
            vec![Identity {
                name: "users_email_index".into(),
                keys: vec!["email".into()],
            }],
        );
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        let ops = diff(&new, Some(&old), &mut prompter).unwrap();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], Operation::AddUniqueIndex { .. }));
    }

    #[test]
    fn rename_confirmed_emits_single_rename_operation() {
        let old = snapshot("users", vec![attribute("id", true), attribute("full_name", false)], vec![]);
        let new = snapshot("users", vec![attribute("id", true), attribute("name", false)], vec![]);
        let mut prompter = ScriptedPrompter::new(["yes"]);
        let ops = diff(&new, Some(&old), &mut prompter).unwrap();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], Operation::RenameAttribute { .. }));
    }
}
