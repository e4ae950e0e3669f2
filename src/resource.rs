//! External interfaces (§6) this crate consumes but does not implement in
//! production: the resource-definition framework that supplies the
//! in-memory schema. Kept as traits so the core pipeline never depends on a
//! concrete framework, only on these narrow contracts — production callers
//! implement them against their own resource layer, tests implement them
//! with plain structs.

use crate::symbol::Symbol;
use crate::types::TableName;
use serde_json::Value;

/// A closed table of recognized callable defaults (§4.1, Design Notes
/// "Default rendering"). Rust has no runtime-introspectable closures, so
/// this enum stands in for the source language's "is this callable equal to
/// the UUID v4 generator" check — the resource layer is responsible for
/// classifying a default into one of these variants.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultSpec {
    Uuid4,
    Now,
    Value(Value),
    /// An AST-shaped default (e.g. a three-tuple expression) that always
    /// renders as [`crate::types::NO_DEFAULT`].
    Expression(String),
    None,
}

/// One attribute as reported by the resource layer, prior to migration-type
/// mapping and default rendering.
#[derive(Debug, Clone)]
pub struct AttributeSpec {
    pub name: Symbol,
    /// The resource framework's type name (`"string"`, `"integer"`, ...).
    /// Any name outside the closed migration-type set is a fatal
    /// [`crate::error::MigrationError::UnsupportedType`] at build time.
    pub source_type: Symbol,
    pub default: DefaultSpec,
    pub allow_nil: bool,
    pub primary_key: bool,
}

#[derive(Debug, Clone)]
pub struct IdentitySpec {
    pub name: Symbol,
    pub keys: Vec<Symbol>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    BelongsTo,
    HasOne,
    HasMany,
    ManyToMany,
}

/// Where a relationship points: table, repo, and data-layer marker, used to
/// decide whether a `belongs_to` target "resides in the same data layer and
/// same repo" (§4.1).
#[derive(Debug, Clone)]
pub struct Destination {
    pub table: TableName,
    pub repo: Symbol,
    pub data_layer: Symbol,
}

#[derive(Debug, Clone)]
pub struct RelationshipSpec {
    pub kind: RelationshipKind,
    pub source_field: Symbol,
    pub destination_field: Symbol,
    pub destination: Destination,
}

/// Resource introspection (§6): everything the Snapshot Builder needs from
/// one resource definition.
pub trait ResourceHandle {
    fn table(&self) -> TableName;
    fn repo(&self) -> Symbol;
    fn data_layer(&self) -> Symbol;
    fn attributes(&self) -> Vec<AttributeSpec>;
    fn identities(&self) -> Vec<IdentitySpec>;
    fn relationships(&self) -> Vec<RelationshipSpec>;
}

/// Repo configuration (§6): the repo handle's last-name segment is derived
/// from [`crate::types::RepoId::last_segment`] directly; this trait covers
/// the remaining piece the builder needs — which extensions are installed,
/// to decide whether a UUID v4 default can render as `uuid_generate_v4()`.
pub trait RepoConfig {
    fn installed_extensions(&self) -> Vec<Symbol>;
}

pub mod json {
    //! A JSON-backed [`ResourceHandle`]/[`RepoConfig`] pair, so the binary
    //! entry point has something concrete to run the pipeline against
    //! without depending on any particular resource-definition framework
    //! (§1, out of scope). The resource-definition framework a real adopter
    //! plugs in would implement [`ResourceHandle`] directly instead of going
    //! through this JSON shape.

    use super::{AttributeSpec, DefaultSpec, Destination, IdentitySpec, RelationshipKind, RelationshipSpec, RepoConfig, ResourceHandle};
    use crate::symbol::Symbol;
    use crate::types::TableName;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct ResourceSet {
        pub repo: String,
        #[serde(default)]
        pub installed_extensions: Vec<String>,
        pub resources: Vec<JsonResource>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct JsonResource {
        pub table: String,
        #[serde(default = "default_data_layer")]
        pub data_layer: String,
        pub attributes: Vec<JsonAttribute>,
        #[serde(default)]
        pub identities: Vec<JsonIdentity>,
        #[serde(default)]
        pub relationships: Vec<JsonRelationship>,
    }

    fn default_data_layer() -> String {
        "postgres".to_owned()
    }

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct JsonAttribute {
        pub name: String,
        pub source_type: String,
        #[serde(default)]
        pub default: JsonDefault,
        #[serde(default)]
        pub allow_nil: bool,
        #[serde(default)]
        pub primary_key: bool,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    pub enum JsonDefault {
        Uuid4,
        Now,
        Value {
            value: serde_json::Value,
        },
        Expression {
            expression: String,
        },
        #[default]
        None,
    }

    impl From<JsonDefault> for DefaultSpec {
        fn from(value: JsonDefault) -> Self {
            match value {
                JsonDefault::Uuid4 => Self::Uuid4,
                JsonDefault::Now => Self::Now,
                JsonDefault::Value { value } => Self::Value(value),
                JsonDefault::Expression { expression } => Self::Expression(expression),
                JsonDefault::None => Self::None,
            }
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct JsonIdentity {
        pub name: String,
        pub keys: Vec<String>,
    }

    #[derive(Debug, Clone, Copy, Deserialize)]
    #[serde(deny_unknown_fields, rename_all = "snake_case")]
    pub enum JsonRelationshipKind {
        BelongsTo,
        HasOne,
        HasMany,
        ManyToMany,
    }

    impl From<JsonRelationshipKind> for RelationshipKind {
        fn from(value: JsonRelationshipKind) -> Self {
            match value {
                JsonRelationshipKind::BelongsTo => Self::BelongsTo,
                JsonRelationshipKind::HasOne => Self::HasOne,
                JsonRelationshipKind::HasMany => Self::HasMany,
                JsonRelationshipKind::ManyToMany => Self::ManyToMany,
            }
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct JsonRelationship {
        pub kind: JsonRelationshipKind,
        pub source_field: String,
        pub destination_field: String,
        pub destination_table: String,
        pub destination_repo: String,
        #[serde(default = "default_data_layer")]
        pub destination_data_layer: String,
    }

    /// Not a [`ResourceHandle`] itself: `repo` lives on the enclosing
    /// [`ResourceSet`], so [`BoundResource`] is the type that implements the
    /// trait, borrowing from a `JsonResource` plus the set's repo string.
    impl JsonResource {
        fn table(&self) -> TableName {
            TableName::new(self.table.as_str())
        }

        fn data_layer(&self) -> Symbol {
            Symbol::new(self.data_layer.as_str())
        }

        fn attributes(&self) -> Vec<AttributeSpec> {
            self.attributes
                .iter()
                .map(|attribute| AttributeSpec {
                    name: Symbol::new(attribute.name.as_str()),
                    source_type: Symbol::new(attribute.source_type.as_str()),
                    default: DefaultSpec::from(attribute.default.clone()),
                    allow_nil: attribute.allow_nil,
                    primary_key: attribute.primary_key,
                })
                .collect()
        }

        fn identities(&self) -> Vec<IdentitySpec> {
            self.identities
                .iter()
                .map(|identity| IdentitySpec {
                    name: Symbol::new(identity.name.as_str()),
                    keys: identity.keys.iter().map(|key| Symbol::new(key.as_str())).collect(),
                })
                .collect()
        }

        fn relationships(&self) -> Vec<RelationshipSpec> {
            self.relationships
                .iter()
                .map(|relationship| RelationshipSpec {
                    kind: RelationshipKind::from(relationship.kind),
                    source_field: Symbol::new(relationship.source_field.as_str()),
                    destination_field: Symbol::new(relationship.destination_field.as_str()),
                    destination: Destination {
                        table: TableName::new(relationship.destination_table.as_str()),
                        repo: Symbol::new(relationship.destination_repo.as_str()),
                        data_layer: Symbol::new(relationship.destination_data_layer.as_str()),
                    },
                })
                .collect()
        }
    }

    /// Binds a [`JsonResource`] to the repo it was declared under, since
    /// [`ResourceHandle::repo`] needs an owned answer and the JSON shape
    /// keeps `repo` at the set level rather than repeating it per resource.
    pub struct BoundResource<'a> {
        pub repo: &'a str,
        pub resource: &'a JsonResource,
    }

    impl ResourceHandle for BoundResource<'_> {
        fn table(&self) -> TableName {
            self.resource.table()
        }

        fn repo(&self) -> Symbol {
            Symbol::new(self.repo)
        }

        fn data_layer(&self) -> Symbol {
            self.resource.data_layer()
        }

        fn attributes(&self) -> Vec<AttributeSpec> {
            self.resource.attributes()
        }

        fn identities(&self) -> Vec<IdentitySpec> {
            self.resource.identities()
        }

        fn relationships(&self) -> Vec<RelationshipSpec> {
            self.resource.relationships()
        }
    }

    impl ResourceSet {
        pub fn from_json(text: &str) -> serde_json::Result<Self> {
            serde_json::from_str(text)
        }

        pub fn handles(&self) -> Vec<BoundResource<'_>> {
            self.resources
                .iter()
                .map(|resource| BoundResource { repo: &self.repo, resource })
                .collect()
        }
    }

    impl RepoConfig for ResourceSet {
        fn installed_extensions(&self) -> Vec<Symbol> {
            self.installed_extensions.iter().map(|ext| Symbol::new(ext.as_str())).collect()
        }
    }
}
