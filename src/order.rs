//! Orderer (§4.6): a stable insertion sort that reorders operations so every
//! dependency edge points backwards.

use crate::types::Operation;

/// Orders `ops` so that every operation appears after everything it depends
/// on, per the `after?` predicate table (§4.6). Stable: operations with no
/// ordering constraint between them keep their relative input order.
pub fn order(ops: Vec<Operation>) -> Vec<Operation> {
    let mut acc: Vec<Operation> = Vec::with_capacity(ops.len());
    for op in ops {
        // Lower bound: right after the last already-placed op this one must
        // follow. Upper bound: right before the first already-placed op that
        // must follow this one. Unconstrained ops land at the upper bound,
        // which defaults to the end, keeping their relative input order.
        let lower = acc.iter().rposition(|earlier| after(&op, earlier)).map_or(0, |index| index + 1);
        let upper = acc.iter().position(|later| after(later, &op)).unwrap_or(acc.len());
        let index = if lower <= upper { upper } else { lower };
        acc.insert(index, op);
    }
    acc
}

fn keys_contain(keys: &[crate::symbol::Symbol], name: &crate::symbol::Symbol) -> bool {
    keys.contains(name)
}

/// `after?(op, prev)`: true when `op` must be emitted after `prev`. First
/// matching rule wins; default false.
fn after(op: &Operation, prev: &Operation) -> bool {
    use Operation::*;

    match (op, prev) {
        (AddUniqueIndex { identity, table }, AddAttribute { table: prev_table, attribute }) => {
            table == prev_table && keys_contain(&identity.keys, &attribute.name)
        }
        (AddUniqueIndex { identity, table }, AlterAttribute { table: prev_table, new_attribute, .. }) => {
            table == prev_table && keys_contain(&identity.keys, &new_attribute.name)
        }
        (AddUniqueIndex { identity, table }, RenameAttribute { table: prev_table, new_attribute, .. }) => {
            table == prev_table && keys_contain(&identity.keys, &new_attribute.name)
        }
        (AddUniqueIndex { table, .. }, CreateTable { table: prev_table }) => table == prev_table,

        (RemoveUniqueIndex { identity, table }, RemoveAttribute { table: prev_table, attribute }) => {
            table == prev_table && keys_contain(&identity.keys, &attribute.name)
        }
        (RemoveUniqueIndex { identity, table }, RenameAttribute { table: prev_table, old_attribute, .. }) => {
            table == prev_table && keys_contain(&identity.keys, &old_attribute.name)
        }

        (AddAttribute { table, .. }, CreateTable { table: prev_table }) => table == prev_table,
        (AddAttribute { table, attribute }, AddAttribute { table: prev_table, attribute: prev_attribute }) => {
            let references_prev_column =
                matches!(&attribute.references, Some(reference) if reference.table == *prev_table && reference.destination_field == prev_attribute.name);
            let demotes_after_pk = table == prev_table && !attribute.primary_key && prev_attribute.primary_key;
            references_prev_column || demotes_after_pk
        }
        (AddAttribute { table, attribute }, RemoveAttribute { table: prev_table, attribute: prev_attribute }) => {
            table == prev_table && attribute.primary_key && prev_attribute.primary_key
        }

        (
            AlterAttribute {
                table,
                old_attribute,
                new_attribute,
            },
            AddAttribute {
                table: prev_table,
                attribute: prev_attribute,
            },
        ) if table == prev_table && old_attribute.primary_key && !new_attribute.primary_key && prev_attribute.primary_key => true,
        (AlterAttribute { table, old_attribute, new_attribute }, AddAttribute { table: prev_table, attribute: prev_attribute }) => {
            let same_attribute = table == prev_table && old_attribute.name == prev_attribute.name;
            let references_prev_column =
                matches!(&new_attribute.references, Some(reference) if reference.table == *prev_table && reference.destination_field == prev_attribute.name);
            same_attribute || references_prev_column
        }

        (RemoveAttribute { table, attribute }, AlterAttribute { old_attribute, .. }) => {
            matches!(&old_attribute.references, Some(reference) if reference.table == *table && reference.destination_field == attribute.name)
        }

        _ => alter_with_references_goes_last(op, prev),
    }
}

/// "references-bearing alters go last": a catch-all rule that outranks
/// everything not already matched above.
fn alter_with_references_goes_last(op: &Operation, prev: &Operation) -> bool {
    match op {
        Operation::AlterAttribute { new_attribute, .. } if new_attribute.references.is_some() => !is_reference_bearing_alter(prev),
        _ => false,
    }
}

fn is_reference_bearing_alter(op: &Operation) -> bool {
    matches!(op, Operation::AlterAttribute { new_attribute, .. } if new_attribute.references.is_some())
}
