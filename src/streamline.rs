//! Streamliner (§4.7): a single left-to-right peephole pass that fuses an
//! `AddAttribute` immediately followed by the `AlterAttribute` that restores
//! its references, undoing the Differ's references-first split once the
//! Orderer no longer needs the two-step edge.

use crate::types::Operation;

pub fn streamline(ops: Vec<Operation>) -> Vec<Operation> {
    let mut result: Vec<Operation> = Vec::with_capacity(ops.len());
    for op in ops {
        if let Some(fused) = result.last().and_then(|prev| try_fuse(prev, &op)) {
            result.pop();
            result.push(fused);
        } else {
            result.push(op);
        }
    }
    result
}

fn try_fuse(prev: &Operation, op: &Operation) -> Option<Operation> {
    let Operation::AddAttribute {
        table: add_table,
        attribute: added,
    } = prev
    else {
        return None;
    };
    let Operation::AlterAttribute {
        table: alter_table,
        old_attribute,
        new_attribute,
    } = op
    else {
        return None;
    };

    if add_table != alter_table || old_attribute.name != added.name || new_attribute.name != added.name || new_attribute.references.is_none() {
        return None;
    }

    Some(Operation::AddAttribute {
        table: add_table.clone(),
        attribute: new_attribute.clone(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{MigrationType, Reference, TableName, NO_DEFAULT};

    fn attribute(name: &str) -> crate::types::Attribute {
        crate::types::Attribute {
            name: name.into(),
            kind: MigrationType::Text,
            default: NO_DEFAULT.to_owned(),
            allow_nil: true,
            primary_key: false,
            references: None,
        }
    }

    #[test]
    fn fuses_split_reference_add_into_one_attribute() {
        let table = TableName::new("comments");
        let bare = attribute("post_id");
        let mut with_ref = attribute("post_id");
        with_ref.references = Some(Reference {
            table: TableName::new("posts"),
            destination_field: "id".into(),
        });

        let ops = vec![
            Operation::AddAttribute {
                table: table.clone(),
                attribute: bare.clone(),
            },
            Operation::AlterAttribute {
                table: table.clone(),
                old_attribute: bare,
                new_attribute: with_ref.clone(),
            },
        ];
        let fused = streamline(ops);
        assert_eq!(fused.len(), 1);
        assert!(matches!(&fused[0], Operation::AddAttribute { attribute, .. } if attribute.references.is_some()));
    }

    #[test]
    fn unrelated_operations_pass_through() {
        let table = TableName::new("posts");
        let ops = vec![
            Operation::CreateTable { table: table.clone() },
            Operation::AddAttribute {
                table,
                attribute: attribute("id"),
            },
        ];
        let result = streamline(ops.clone());
        assert_eq!(result, ops);
    }
}
