//! Emitter (§4.9): renders phases into migration text, writes it to disk
//! alongside the merged snapshots it supersedes.

use crate::error::MigrationResult;
use crate::render::{Formatter, MigrationRenderer};
use crate::snapshot::store;
use crate::symbol::underscore;
use crate::types::{Phase, Snapshot};
use std::path::{Path, PathBuf};

pub struct EmitResult {
    pub migration_path: PathBuf,
    pub module_name: String,
}

/// Renders `phases` and writes the migration artifact plus every merged
/// snapshot that contributed to it.
pub fn emit(
    snapshot_dir: &Path,
    migration_dir: &Path,
    repo_last_segment: &str,
    phases: &[Phase],
    snapshots: &[Snapshot],
    renderer: &dyn MigrationRenderer,
    formatter: Option<&dyn Formatter>,
) -> MigrationResult<EmitResult> {
    let repo_segment = underscore(repo_last_segment);
    let migrations_dir = migration_dir.join(&repo_segment).join("migrations");
    std::fs::create_dir_all(&migrations_dir)?;

    let sequence = next_sequence(&migrations_dir, renderer.extension())?;
    let module_name = format!("{repo_last_segment}.Migrations.MigrateResources{sequence}");

    let up_body = renderer.render_up(phases);
    let down_body = renderer.render_down(phases);
    let mut text = format!(
        "defmodule {module_name} do\n  def up do\n{}\n  end\n\n  def down do\n{}\n  end\nend\n",
        indent(&up_body, 4),
        indent(&down_body, 4),
    );
    if let Some(formatter) = formatter {
        text = formatter.format(&text);
    }

    let timestamp = crate::time::migration_timestamp(crate::time::now());
    let file_name = format!("{timestamp}_migrate_resources{sequence}.{}", renderer.extension());
    let migration_path = migrations_dir.join(file_name);
    std::fs::write(&migration_path, text)?;

    for snapshot in snapshots {
        store::save(snapshot_dir, snapshot)?;
    }

    Ok(EmitResult { migration_path, module_name })
}

fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines().map(|line| format!("{pad}{line}")).collect::<Vec<_>>().join("\n")
}

/// `N` = 1 + count of existing migration files matching the naming scheme in
/// `migrations_dir` (§4.9, §6).
fn next_sequence(migrations_dir: &Path, extension: &str) -> MigrationResult<u32> {
    let suffix = format!(".{extension}");
    let mut count = 0u32;
    for entry in std::fs::read_dir(migrations_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.contains("_migrate_resources") && name.ends_with(&suffix) {
            count += 1;
        }
    }
    Ok(count + 1)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::render::PostgresRenderer;
    use crate::types::{RepoId, TableName};

    #[test]
    fn writes_migration_file_and_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot_dir = dir.path().join("snapshots");
        let migration_dir = dir.path().join("priv");
        let table = TableName::new("posts");
        let phases = vec![Phase::Create { table: table.clone(), operations: vec![] }];
        let snapshot = Snapshot {
            table,
            repo: RepoId::new("MyApp.Repo"),
            attributes: vec![],
            identities: vec![],
            hash: "x".to_owned(),
        };
        let renderer = PostgresRenderer;
        let result = emit(&snapshot_dir, &migration_dir, "Repo", &phases, &[snapshot.clone()], &renderer, None).unwrap();
        assert!(result.migration_path.exists());
        assert_eq!(store::load(&snapshot_dir, &snapshot.repo, &snapshot.table).unwrap(), Some(snapshot));
    }

    #[test]
    fn second_migration_increments_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot_dir = dir.path().join("snapshots");
        let migration_dir = dir.path().join("priv");
        let table = TableName::new("posts");
        let phases = vec![Phase::Create { table, operations: vec![] }];
        let renderer = PostgresRenderer;
        emit(&snapshot_dir, &migration_dir, "Repo", &phases, &[], &renderer, None).unwrap();
        let second = emit(&snapshot_dir, &migration_dir, "Repo", &phases, &[], &renderer, None).unwrap();
        assert!(second.module_name.ends_with("MigrateResources2"));
    }
}
