//! End-to-end coverage of the scenarios in `spec.md` §8, driving the
//! diff → order → streamline → phase pipeline directly against snapshot
//! fixtures (no resource framework needed for these).

use schema_migrator::diff;
use schema_migrator::order::order;
use schema_migrator::phase::phase;
use schema_migrator::prompt::ScriptedPrompter;
use schema_migrator::streamline::streamline;
use schema_migrator::types::{Attribute, Identity, MigrationType, Operation, Phase, Reference, RepoId, Snapshot, TableName, NO_DEFAULT};

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

fn binary_id(name: &str, primary_key: bool) -> Attribute {
    Attribute {
        kind: MigrationType::BinaryId,
        ..attribute(name, primary_key)
    }
}

fn snapshot(table: &str, attributes: Vec<Attribute>) -> Snapshot {
    Snapshot {
        table: TableName::new(table),
        repo: RepoId::new("MyApp.Repo"),
        attributes,
        identities: vec![],
        hash: String::new(),
    }
}

fn pipeline(new: &Snapshot, existing: Option<&Snapshot>, prompter: &mut ScriptedPrompter) -> Vec<Phase> {
    let ops = diff::diff(new, existing, prompter).unwrap();
    phase(streamline(order(ops)))
}

#[test]
fn s1_new_table_creates_one_phase_with_all_attributes() {
    let new = snapshot("posts", vec![binary_id("id", true), attribute("title", false)]);
    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
    let phases = pipeline(&new, None, &mut prompter);

    assert_eq!(phases.len(), 1);
    match &phases[0] {
        Phase::Create { table, operations } => {
            assert_eq!(table.as_str(), "posts");
            assert_eq!(operations.len(), 2);
            assert!(matches!(&operations[0], Operation::AddAttribute { attribute, .. } if attribute.name.as_str() == "id"));
            assert!(matches!(&operations[1], Operation::AddAttribute { attribute, .. } if attribute.name.as_str() == "title"));
        }
        other => panic!("expected a Create phase, got {other:?}"),
    }
}

#[test]
fn s2_fk_column_is_ordered_and_fused_after_its_target() {
    let posts_new = snapshot("posts", vec![binary_id("id", true)]);

    let mut post_id = attribute("post_id", false);
    post_id.references = Some(Reference {
        table: TableName::new("posts"),
        destination_field: "id".into(),
    });
    let comments_new = snapshot("comments", vec![binary_id("id", true), post_id]);

    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
    let mut ops = diff::diff(&posts_new, None, &mut prompter).unwrap();
    ops.extend(diff::diff(&comments_new, None, &mut prompter).unwrap());

    let ordered = order(ops);
    let fused = streamline(ordered);

    let post_id_index = fused
        .iter()
        .position(|op| matches!(op, Operation::AddAttribute { attribute, .. } if attribute.name.as_str() == "post_id"))
        .expect("post_id survives as one fused AddAttribute");
    assert!(matches!(&fused[post_id_index], Operation::AddAttribute { attribute, .. } if attribute.references.is_some()));

    let posts_id_index = fused
        .iter()
        .position(|op| matches!(op, Operation::AddAttribute { table, attribute } if table.as_str() == "posts" && attribute.name.as_str() == "id"))
        .expect("posts.id is created somewhere");
    assert!(post_id_index > posts_id_index);
}

#[test]
fn s3_rename_confirmed_yields_one_rename_operation() {
    let old = snapshot("users", vec![binary_id("id", true), attribute("full_name", false)]);
    let new = snapshot("users", vec![binary_id("id", true), attribute("name", false)]);

    let mut prompter = ScriptedPrompter::new(["yes"]);
    let ops = diff::diff(&new, Some(&old), &mut prompter).unwrap();
    assert_eq!(ops.len(), 1);
    assert!(matches!(&ops[0], Operation::RenameAttribute { old_attribute, new_attribute, .. }
        if old_attribute.name.as_str() == "full_name" && new_attribute.name.as_str() == "name"));
}

#[test]
fn s3_rename_declined_yields_add_and_remove() {
    let old = snapshot("users", vec![binary_id("id", true), attribute("full_name", false)]);
    let new = snapshot("users", vec![binary_id("id", true), attribute("name", false)]);

    let mut prompter = ScriptedPrompter::new(["no"]);
    let ops = diff::diff(&new, Some(&old), &mut prompter).unwrap();
    assert_eq!(ops.len(), 2);
    assert!(ops.iter().any(|op| matches!(op, Operation::AddAttribute { attribute, .. } if attribute.name.as_str() == "name")));
    assert!(ops.iter().any(|op| matches!(op, Operation::RemoveAttribute { attribute, .. } if attribute.name.as_str() == "full_name")));
}

#[test]
fn s4_identity_added_emits_a_single_add_unique_index() {
    let old = snapshot("users", vec![binary_id("id", true), attribute("email", false)]);
    let mut new = snapshot("users", vec![binary_id("id", true), attribute("email", false)]);
    new.identities = vec![Identity {
        name: "users_email_index".into(),
        keys: vec!["email".into()],
    }];

    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
    let ops = diff::diff(&new, Some(&old), &mut prompter).unwrap();
    assert_eq!(ops.len(), 1);
    assert!(matches!(&ops[0], Operation::AddUniqueIndex { .. }));
}

#[test]
fn s5_primary_key_swap_orders_new_pk_before_old_pk_demotion() {
    // Old `t{a pk}`; new `t{a, b pk}` — `b` is a newly added pk column, `a`
    // is demoted. The new pk must exist before the old one is demoted.
    let old = snapshot("t", vec![attribute("a", true)]);
    let new = snapshot(
        "t",
        vec![
            Attribute { primary_key: false, allow_nil: true, ..attribute("a", false) },
            attribute("b", true),
        ],
    );

    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
    let ops = diff::diff(&new, Some(&old), &mut prompter).unwrap();
    let ordered = order(ops);

    let demote_a_index = ordered
        .iter()
        .position(|op| matches!(op, Operation::AlterAttribute { old_attribute, new_attribute, .. }
            if old_attribute.name.as_str() == "a" && old_attribute.primary_key && !new_attribute.primary_key))
        .expect("a's demotion is present");
    let add_b_index = ordered
        .iter()
        .position(|op| matches!(op, Operation::AddAttribute { attribute, .. } if attribute.name.as_str() == "b" && attribute.primary_key))
        .expect("b's addition is present");

    assert!(add_b_index < demote_a_index);
}

#[test]
fn s6_identical_snapshots_yield_no_operations() {
    let attributes = vec![binary_id("a", true), attribute("b", false)];
    let old = snapshot("t", attributes.clone());
    let new = snapshot("t", attributes);

    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
    let ops = diff::diff(&new, Some(&old), &mut prompter).unwrap();
    assert!(ops.is_empty());
}

#[test]
fn invariant_create_table_precedes_every_attribute_level_op_on_its_table() {
    let new = snapshot("posts", vec![binary_id("id", true), attribute("title", false)]);
    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
    let ops = diff::diff(&new, None, &mut prompter).unwrap();
    let ordered = order(ops);

    let create_index = ordered.iter().position(|op| matches!(op, Operation::CreateTable { .. })).unwrap();
    for (index, op) in ordered.iter().enumerate() {
        if op.is_attribute_level() && op.table().as_str() == "posts" {
            assert!(index > create_index);
        }
    }
}

#[test]
fn invariant_phaser_closure_every_operation_lands_somewhere() {
    let new = snapshot("posts", vec![binary_id("id", true), attribute("title", false)]);
    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
    let ops = diff::diff(&new, None, &mut prompter).unwrap();
    let input_len = ops.len();
    let phases = phase(streamline(order(ops)));

    let accounted: usize = phases
        .iter()
        .map(|phase| phase.operations().len() + matches!(phase, Phase::Create { .. }) as usize)
        .sum();
    assert_eq!(input_len, accounted);
}
