//! Deduplicator / Merger (§4.3) and primary-key reconciliation (§4.3.1).

use crate::error::{MigrationError, MigrationResult};
use crate::prompt::Prompter;
use crate::snapshot::{builder, store};
use crate::symbol::Symbol;
use crate::types::{Attribute, Identity, MigrationType, Reference, Snapshot, TableName};
use std::collections::BTreeSet;
use std::path::Path;

/// Groups freshly built snapshots by table and merges each group against the
/// stored snapshot for that table, returning one `(merged, existing)` pair
/// per distinct table.
pub fn merge_all(
    snapshot_dir: &Path,
    fresh: Vec<Snapshot>,
    prompter: &mut dyn Prompter,
) -> MigrationResult<Vec<(Snapshot, Option<Snapshot>)>> {
    let mut groups: Vec<(TableName, Vec<Snapshot>)> = Vec::new();
    for snapshot in fresh {
        match groups.iter_mut().find(|(table, _)| *table == snapshot.table) {
            Some((_, bucket)) => bucket.push(snapshot),
            None => groups.push((snapshot.table.clone(), vec![snapshot])),
        }
    }

    groups
        .into_iter()
        .map(|(table, contributors)| merge_table(snapshot_dir, &table, contributors, prompter))
        .collect()
}

fn merge_table(
    snapshot_dir: &Path,
    table: &TableName,
    fresh: Vec<Snapshot>,
    prompter: &mut dyn Prompter,
) -> MigrationResult<(Snapshot, Option<Snapshot>)> {
    let repo = fresh[0].repo.clone();
    let existing = store::load(snapshot_dir, &repo, table)?;

    let (primary_key_names, synthetic_identities) = reconcile_primary_key(table, &fresh, existing.as_ref(), prompter)?;

    let mut attributes = merge_attributes(table, &fresh)?;
    for attribute in &mut attributes {
        attribute.primary_key = primary_key_names.contains(&attribute.name);
    }

    let identities = merge_identities(&fresh, synthetic_identities);
    let hash = builder::content_hash(table, &repo, &attributes, &identities);

    let merged = Snapshot {
        table: table.clone(),
        repo,
        attributes,
        identities,
        hash,
    };
    Ok((merged, existing))
}

fn key_set(keys: &[Symbol]) -> BTreeSet<Symbol> {
    keys.iter().cloned().collect()
}

/// §4.3.1. Returns the reconciled primary key and any synthetic identities
/// created from the candidates that lost.
fn reconcile_primary_key(
    table: &TableName,
    fresh: &[Snapshot],
    existing: Option<&Snapshot>,
    prompter: &mut dyn Prompter,
) -> MigrationResult<(Vec<Symbol>, Vec<Identity>)> {
    let mut distinct: Vec<Vec<Symbol>> = Vec::new();
    for snapshot in fresh {
        let candidate = snapshot.primary_key_names();
        if !distinct.iter().any(|d| key_set(d) == key_set(&candidate)) {
            distinct.push(candidate);
        }
    }

    let existing_pk = existing.map(Snapshot::primary_key_names);
    let agreement = existing_pk
        .as_ref()
        .and_then(|pk| distinct.iter().find(|candidate| key_set(candidate) == key_set(pk)));

    match agreement {
        Some(_) => {
            let chosen = existing_pk.unwrap();
            let synthetic = distinct
                .iter()
                .filter(|candidate| key_set(candidate) != key_set(&chosen))
                .map(|keys| synthetic_identity(table, keys))
                .collect();
            Ok((chosen, synthetic))
        }
        None if distinct.len() == 1 => Ok((distinct.into_iter().next().unwrap(), Vec::new())),
        None => prompt_primary_key(table, distinct, prompter),
    }
}

fn prompt_primary_key(
    table: &TableName,
    distinct: Vec<Vec<Symbol>>,
    prompter: &mut dyn Prompter,
) -> MigrationResult<(Vec<Symbol>, Vec<Identity>)> {
    let mut message = format!("Table {table} has conflicting candidate primary keys:\n");
    for (index, candidate) in distinct.iter().enumerate() {
        message.push_str(&format!("  {}. {}\n", index + 1, join_names(candidate)));
    }
    message.push_str("Which candidate is the primary key? (enter a number)");

    let chosen_index = loop {
        let answer = prompter.prompt(&message)?;
        if let Ok(index) = answer.trim().parse::<usize>() {
            if index >= 1 && index <= distinct.len() {
                break index - 1;
            }
        }
    };

    let chosen = distinct[chosen_index].clone();
    let synthetic = distinct
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != chosen_index)
        .map(|(_, keys)| synthetic_identity(table, keys))
        .collect();
    Ok((chosen, synthetic))
}

fn join_names(keys: &[Symbol]) -> String {
    keys.iter().map(Symbol::as_str).collect::<Vec<_>>().join(", ")
}

fn synthetic_identity(table: &TableName, keys: &[Symbol]) -> Identity {
    let suffix = keys.iter().map(Symbol::as_str).collect::<Vec<_>>().join("_");
    Identity {
        name: Symbol::new(format!("{table}_{suffix}")),
        keys: keys.to_vec(),
    }
}

fn merge_attributes(table: &TableName, fresh: &[Snapshot]) -> MigrationResult<Vec<Attribute>> {
    let mut names: Vec<Symbol> = Vec::new();
    for snapshot in fresh {
        for attribute in &snapshot.attributes {
            if !names.contains(&attribute.name) {
                names.push(attribute.name.clone());
            }
        }
    }
    names.sort();

    names
        .into_iter()
        .map(|name| {
            let contributors: Vec<&Attribute> = fresh.iter().filter_map(|s| s.attribute(name.as_str())).collect();
            merge_attribute(table, &name, &contributors)
        })
        .collect()
}

fn merge_attribute(table: &TableName, name: &Symbol, contributors: &[&Attribute]) -> MigrationResult<Attribute> {
    if let [only] = contributors {
        return Ok((*only).clone());
    }

    let kind = unique_type(table, name, contributors)?;
    let default = unique_default(contributors);
    let allow_nil = contributors.iter().any(|attribute| attribute.allow_nil);
    let references = unique_reference(table, name, contributors)?;

    Ok(Attribute {
        name: name.clone(),
        kind,
        default,
        allow_nil,
        primary_key: false,
        references,
    })
}

fn unique_type(table: &TableName, name: &Symbol, contributors: &[&Attribute]) -> MigrationResult<MigrationType> {
    let mut distinct = Vec::new();
    for attribute in contributors {
        if !distinct.contains(&attribute.kind) {
            distinct.push(attribute.kind);
        }
    }
    match distinct.as_slice() {
        [kind] => Ok(*kind),
        _ => Err(MigrationError::ConflictingTypes {
            table: table.clone(),
            attribute: name.clone(),
        }),
    }
}

fn unique_default(contributors: &[&Attribute]) -> String {
    let first = &contributors[0].default;
    if contributors.iter().all(|attribute| &attribute.default == first) {
        first.clone()
    } else {
        crate::types::NO_DEFAULT.to_owned()
    }
}

fn unique_reference(table: &TableName, name: &Symbol, contributors: &[&Attribute]) -> MigrationResult<Option<Reference>> {
    let mut distinct: Vec<&Reference> = Vec::new();
    for attribute in contributors {
        if let Some(reference) = &attribute.references {
            if !distinct.iter().any(|existing| *existing == reference) {
                distinct.push(reference);
            }
        }
    }
    match distinct.as_slice() {
        [] => Ok(None),
        [only] => Ok(Some((*only).clone())),
        _ => Err(MigrationError::ConflictingReferences {
            table: table.clone(),
            attribute: name.clone(),
        }),
    }
}

fn merge_identities(fresh: &[Snapshot], synthetic: Vec<Identity>) -> Vec<Identity> {
    let mut combined: Vec<Identity> = Vec::new();
    for snapshot in fresh {
        for identity in &snapshot.identities {
            if !combined.iter().any(|existing| existing.key_set() == identity.key_set()) {
                combined.push(identity.clone());
            }
        }
    }
    for identity in synthetic {
        if !combined.iter().any(|existing| existing.key_set() == identity.key_set()) {
            combined.push(identity);
        }
    }
    combined.sort_by(|a, b| a.name.cmp(&b.name));
    combined
}
