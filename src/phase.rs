//! Phaser (§4.8): groups consecutive same-table operations into `Create` or
//! `Alter` phases.

use crate::types::{Operation, Phase};

pub fn phase(ops: Vec<Operation>) -> Vec<Phase> {
    let mut phases = Vec::new();
    let mut open: Option<Phase> = None;

    for op in ops {
        match op {
            Operation::CreateTable { table } => {
                close(&mut open, &mut phases);
                open = Some(Phase::Create { table, operations: Vec::new() });
            }
            op if op.is_attribute_level() => match &mut open {
                Some(phase) if phase.table() == op.table() => match phase {
                    Phase::Create { operations, .. } | Phase::Alter { operations, .. } => operations.push(op),
                },
                Some(_) => {
                    close(&mut open, &mut phases);
                    open = Some(Phase::Alter {
                        table: op.table().clone(),
                        operations: vec![op],
                    });
                }
                None => {
                    open = Some(Phase::Alter {
                        table: op.table().clone(),
                        operations: vec![op],
                    });
                }
            },
            other => {
                close(&mut open, &mut phases);
                let table = other.table().clone();
                phases.push(Phase::Alter {
                    table,
                    operations: vec![other],
                });
            }
        }
    }

    close(&mut open, &mut phases);
    phases
}

fn close(open: &mut Option<Phase>, phases: &mut Vec<Phase>) {
    if let Some(phase) = open.take() {
        phases.push(phase);
    }
}
