//! Snapshot Store (§4.2): loads and persists [`Snapshot`] values as JSON on
//! disk, keyed by `(repo, table)`.

use crate::error::MigrationResult;
use crate::symbol::underscore;
use crate::types::{RepoId, Snapshot, TableName};
use std::path::{Path, PathBuf};

/// Where a snapshot for `(repo, table)` lives under `snapshot_dir`:
/// `<snapshot_path>/<underscore(last_segment(repo))>/<table>.json`.
pub fn path_for(snapshot_dir: &Path, repo: &RepoId, table: &TableName) -> PathBuf {
    snapshot_dir.join(underscore(repo.last_segment())).join(format!("{table}.json"))
}

/// Loads the snapshot on disk for `(repo, table)`. Returns `Ok(None)` when no
/// file exists yet — distinct from an empty snapshot, per §4.2.
pub fn load(snapshot_dir: &Path, repo: &RepoId, table: &TableName) -> MigrationResult<Option<Snapshot>> {
    let path = path_for(snapshot_dir, repo, table);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)?;
    let snapshot: Snapshot = serde_json::from_str(&contents)?;
    Ok(Some(snapshot))
}

/// Writes `snapshot` to disk, creating the repo subdirectory if needed.
pub fn save(snapshot_dir: &Path, snapshot: &Snapshot) -> MigrationResult<()> {
    let path = path_for(snapshot_dir, &snapshot.repo, &snapshot.table);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(&path, contents)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{Attribute, MigrationType, NO_DEFAULT};

    fn sample_snapshot() -> Snapshot {
        Snapshot {
            table: TableName::new("posts"),
            repo: RepoId::new("MyApp.Repo"),
            attributes: vec![Attribute {
                name: "id".into(),
                kind: MigrationType::BinaryId,
                default: NO_DEFAULT.to_owned(),
                allow_nil: false,
                primary_key: true,
                references: None,
            }],
            identities: vec![],
            hash: "deadbeef".to_owned(),
        }
    }

    #[test]
    fn missing_file_is_none_not_empty_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let result = load(dir.path(), &RepoId::new("MyApp.Repo"), &TableName::new("posts")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = sample_snapshot();
        save(dir.path(), &snapshot).unwrap();
        let loaded = load(dir.path(), &snapshot.repo, &snapshot.table).unwrap().unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn unknown_field_fails_strict_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = path_for(dir.path(), &RepoId::new("MyApp.Repo"), &TableName::new("posts"));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"table":"posts","repo":"MyApp.Repo","hash":"x","attributes":[],"identities":[],"bogus":1}"#).unwrap();
        let err = load(dir.path(), &RepoId::new("MyApp.Repo"), &TableName::new("posts")).unwrap_err();
        assert!(matches!(err, crate::error::MigrationError::SnapshotDecode(_)));
    }
}
