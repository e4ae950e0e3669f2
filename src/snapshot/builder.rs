//! Snapshot Builder (§4.1): turns one resource handle into a canonical
//! [`Snapshot`].

use crate::error::{MigrationError, MigrationResult};
use crate::resource::{DefaultSpec, RelationshipKind, RepoConfig, ResourceHandle};
use crate::symbol::Symbol;
use crate::types::{Attribute, Identity, MigrationType, Reference, Snapshot, TableName, NO_DEFAULT};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

const UUID_OSSP_EXTENSION: &str = "uuid-ossp";

impl MigrationType {
    fn from_source_type(name: &str) -> MigrationResult<Self> {
        match name {
            "string" => Ok(Self::Text),
            "integer" => Ok(Self::Integer),
            "boolean" => Ok(Self::Boolean),
            "binary_id" => Ok(Self::BinaryId),
            other => Err(MigrationError::UnsupportedType(other.to_owned())),
        }
    }
}

/// Builds a canonical [`Snapshot`] from one resource handle (§4.1).
pub fn build(resource: &dyn ResourceHandle, repo_config: &dyn RepoConfig) -> MigrationResult<Snapshot> {
    let table = resource.table();
    let repo = resource.repo();
    let data_layer = resource.data_layer();
    let relationships = resource.relationships();
    let extensions = repo_config.installed_extensions();

    let mut attributes = Vec::new();
    for spec in resource.attributes() {
        let kind = MigrationType::from_source_type(&spec.source_type)?;
        let default = render_default(&spec.default, kind, &extensions);
        let references = relationships.iter().find_map(|relationship| {
            (relationship.kind == RelationshipKind::BelongsTo
                && relationship.source_field == spec.name
                && relationship.destination.data_layer == data_layer
                && relationship.destination.repo == repo)
                .then(|| Reference {
                    table: relationship.destination.table.clone(),
                    destination_field: relationship.destination_field.clone(),
                })
        });
        attributes.push(Attribute {
            name: spec.name,
            kind,
            default,
            allow_nil: spec.allow_nil,
            primary_key: spec.primary_key,
            references,
        });
    }
    attributes.sort_by(|a, b| a.name.cmp(&b.name));

    let attribute_names: std::collections::HashSet<&Symbol> = attributes.iter().map(|a| &a.name).collect();
    let mut identities: Vec<Identity> = resource
        .identities()
        .into_iter()
        .filter(|identity| identity.keys.iter().all(|key| attribute_names.contains(key)))
        .map(|identity| Identity {
            name: identity.name,
            keys: identity.keys,
        })
        .collect();
    identities.sort_by(|a, b| a.name.cmp(&b.name));

    let repo = crate::types::RepoId::new(repo);
    let hash = content_hash(&table, &repo, &attributes, &identities);

    Ok(Snapshot {
        table,
        repo,
        attributes,
        identities,
        hash,
    })
}

fn render_default(spec: &DefaultSpec, kind: MigrationType, installed_extensions: &[Symbol]) -> String {
    match spec {
        DefaultSpec::Uuid4 if installed_extensions.iter().any(|ext| ext.as_str() == UUID_OSSP_EXTENSION) => {
            "fragment(\"uuid_generate_v4()\")".to_owned()
        }
        DefaultSpec::Now => "fragment(\"now()\")".to_owned(),
        DefaultSpec::Uuid4 | DefaultSpec::Expression(_) => NO_DEFAULT.to_owned(),
        DefaultSpec::Value(value) => render_value(kind, value).unwrap_or_else(|| NO_DEFAULT.to_owned()),
        DefaultSpec::None => NO_DEFAULT.to_owned(),
    }
}

/// Dumps a value default through its migration type's native encoder,
/// rendering its inspected form on success (§4.1). A type mismatch between
/// the declared migration type and the default's JSON shape degrades to
/// [`NO_DEFAULT`].
fn render_value(kind: MigrationType, value: &Value) -> Option<String> {
    match (kind, value) {
        (MigrationType::Text | MigrationType::BinaryId, Value::String(text)) => Some(format!("{text:?}")),
        (MigrationType::Integer, Value::Number(number)) => number.as_i64().map(|n| n.to_string()),
        (MigrationType::Boolean, Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    }
}

#[derive(Serialize)]
struct CanonicalSnapshot<'a> {
    table: &'a TableName,
    repo: &'a crate::types::RepoId,
    attributes: &'a [Attribute],
    identities: &'a [Identity],
}

pub(crate) fn content_hash(
    table: &TableName,
    repo: &crate::types::RepoId,
    attributes: &[Attribute],
    identities: &[Identity],
) -> String {
    let canonical = CanonicalSnapshot {
        table,
        repo,
        attributes,
        identities,
    };
    let bytes = serde_json::to_vec(&canonical).expect("canonical snapshot always serializes");
    let digest = Sha256::digest(&bytes);
    hex::encode(digest)
}
