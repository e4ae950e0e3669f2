//! Downstream rendering interfaces (§6): the phase-to-source-text
//! serializer and an optional post-processing formatter. Both are modeled
//! as traits because fidelity to a particular SQL dialect or formatter is
//! out of scope; [`PostgresRenderer`] and [`NoopFormatter`] exist only so
//! the pipeline is runnable end-to-end.

use crate::types::{Operation, Phase};

/// Renders a set of ordered, phased operations into migration source text.
pub trait MigrationRenderer {
    fn render_up(&self, phases: &[Phase]) -> String;
    fn render_down(&self, phases: &[Phase]) -> String;
    /// File extension (without the leading dot) for the emitted artifact.
    fn extension(&self) -> &'static str;
}

/// An opaque post-processor invoked on the final migration text when the
/// `format` config flag is set (§4.9).
pub trait Formatter {
    fn format(&self, source: &str) -> String;
}

/// A no-op formatter, the default when no real one is wired in.
pub struct NoopFormatter;

impl Formatter for NoopFormatter {
    fn format(&self, source: &str) -> String {
        source.to_owned()
    }
}

/// A deliberately simple renderer targeting the target relational dialect
/// named in `spec.md` §1. Produces the `up()`/`down()` bodies described in
/// §6; the surrounding module declaration is assembled by the Emitter,
/// which is the only stage that knows the migration's sequence number.
/// Does not attempt to match a production migration tool's generated SQL
/// byte-for-byte.
pub struct PostgresRenderer;

impl MigrationRenderer for PostgresRenderer {
    /// The concatenation of each phase's up-rendering, separated by blank
    /// lines (§4.9) — the body of the emitted module's `up()`.
    fn render_up(&self, phases: &[Phase]) -> String {
        phases.iter().map(render_phase_up).collect::<Vec<_>>().join("\n\n")
    }

    /// Phases in reverse order, each rendered with its down-method (§4.9) —
    /// the body of the emitted module's `down()`.
    fn render_down(&self, phases: &[Phase]) -> String {
        phases.iter().rev().map(render_phase_down).collect::<Vec<_>>().join("\n\n")
    }

    fn extension(&self) -> &'static str {
        "exs"
    }
}

fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines().map(|line| format!("{pad}{line}")).collect::<Vec<_>>().join("\n")
}

fn render_phase_up(phase: &Phase) -> String {
    match phase {
        Phase::Create { table, operations } => {
            let columns = operations.iter().map(render_op_up).collect::<Vec<_>>().join("\n");
            format!("create table(:{table}) do\n{}\nend", indent(&columns, 2))
        }
        Phase::Alter { table, operations } => {
            let body = operations.iter().map(render_op_up).collect::<Vec<_>>().join("\n");
            format!("alter table(:{table}) do\n{}\nend", indent(&body, 2))
        }
    }
}

fn render_phase_down(phase: &Phase) -> String {
    let table = phase.table();
    match phase {
        Phase::Create { .. } => format!("drop table(:{table})"),
        Phase::Alter { operations, .. } => {
            let body = operations.iter().rev().map(render_op_down).collect::<Vec<_>>().join("\n");
            format!("alter table(:{table}) do\n{}\nend", indent(&body, 2))
        }
    }
}

fn render_op_up(op: &Operation) -> String {
    match op {
        Operation::CreateTable { .. } => String::new(),
        Operation::AddAttribute { attribute, .. } => format!("add :{}, :{}, default: {}", attribute.name, attribute.kind, attribute.default),
        Operation::AlterAttribute { new_attribute, .. } => format!("modify :{}, :{}", new_attribute.name, new_attribute.kind),
        Operation::RenameAttribute { old_attribute, new_attribute, .. } => format!("rename :{}, to: :{}", old_attribute.name, new_attribute.name),
        Operation::RemoveAttribute { attribute, .. } => format!("remove :{}", attribute.name),
        Operation::AddUniqueIndex { table, identity } => {
            format!("create unique_index(:{table}, [{}])", join_keys(&identity.keys))
        }
        Operation::RemoveUniqueIndex { table, identity } => {
            format!("drop unique_index(:{table}, [{}])", join_keys(&identity.keys))
        }
    }
}

fn render_op_down(op: &Operation) -> String {
    match op {
        Operation::CreateTable { .. } => String::new(),
        Operation::AddAttribute { attribute, .. } => format!("remove :{}", attribute.name),
        Operation::AlterAttribute { old_attribute, .. } => format!("modify :{}, :{}", old_attribute.name, old_attribute.kind),
        Operation::RenameAttribute { old_attribute, new_attribute, .. } => format!("rename :{}, to: :{}", new_attribute.name, old_attribute.name),
        Operation::RemoveAttribute { attribute, .. } => format!("add :{}, :{}, default: {}", attribute.name, attribute.kind, attribute.default),
        Operation::AddUniqueIndex { table, identity } => {
            format!("drop unique_index(:{table}, [{}])", join_keys(&identity.keys))
        }
        Operation::RemoveUniqueIndex { table, identity } => {
            format!("create unique_index(:{table}, [{}])", join_keys(&identity.keys))
        }
    }
}

fn join_keys(keys: &[crate::symbol::Symbol]) -> String {
    keys.iter().map(|key| format!(":{key}")).collect::<Vec<_>>().join(", ")
}
