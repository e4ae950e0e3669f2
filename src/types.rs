//! The closed data model (§3): attributes, identities, snapshots, and the
//! operations/phases the rest of the pipeline produces and consumes.

use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;

/// Sentinel rendered when an attribute has no default (§4.1).
pub const NO_DEFAULT: &str = "nil";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableName(Symbol);

impl TableName {
    pub fn new(name: impl Into<Symbol>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TableName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Opaque repo identifier (§3): a logical database target. Governs the
/// on-disk snapshot subdirectory and the emitted migration module name via
/// [`RepoId::last_segment`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RepoId(Symbol);

impl RepoId {
    pub fn new(name: impl Into<Symbol>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The last dot-separated segment, e.g. `"Repo"` for `"MyApp.Repo"`.
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(self.0.as_str())
    }
}

impl Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RepoId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The closed migration-type set (§3). Any other source type is a fatal
/// [`crate::error::MigrationError::UnsupportedType`] at snapshot build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MigrationType {
    Text,
    Integer,
    Boolean,
    BinaryId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reference {
    pub table: TableName,
    pub destination_field: Symbol,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Attribute {
    pub name: Symbol,
    #[serde(rename = "type")]
    pub kind: MigrationType,
    /// A rendered default expression, or [`NO_DEFAULT`] when absent (§4.1).
    pub default: String,
    #[serde(rename = "allow_nil?")]
    pub allow_nil: bool,
    #[serde(rename = "primary_key?")]
    pub primary_key: bool,
    pub references: Option<Reference>,
}

impl Attribute {
    /// An `AddAttribute`'s attribute, but with `references` stripped — used
    /// by the Differ's reference-first split (§4.4.1) and undone by the
    /// Streamliner (§4.7).
    pub fn without_references(&self) -> Self {
        Self {
            references: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Identity {
    pub name: Symbol,
    pub keys: Vec<Symbol>,
}

impl Identity {
    /// Equality for identities is set-wise over `keys` (§3); this is the
    /// comparison key used throughout the Merger and Differ.
    pub fn key_set(&self) -> BTreeSet<Symbol> {
        self.keys.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    pub table: TableName,
    pub repo: RepoId,
    pub attributes: Vec<Attribute>,
    pub identities: Vec<Identity>,
    pub hash: String,
}

impl Snapshot {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attribute| attribute.name.as_str() == name)
    }

    pub fn primary_key_names(&self) -> Vec<Symbol> {
        let mut names: Vec<Symbol> = self
            .attributes
            .iter()
            .filter(|attribute| attribute.primary_key)
            .map(|attribute| attribute.name.clone())
            .collect();
        names.sort();
        names
    }
}

/// One primitive DDL action in the generated migration (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CreateTable {
        table: TableName,
    },
    AddAttribute {
        table: TableName,
        attribute: Attribute,
    },
    AlterAttribute {
        table: TableName,
        old_attribute: Attribute,
        new_attribute: Attribute,
    },
    RenameAttribute {
        table: TableName,
        old_attribute: Attribute,
        new_attribute: Attribute,
    },
    RemoveAttribute {
        table: TableName,
        attribute: Attribute,
    },
    AddUniqueIndex {
        table: TableName,
        identity: Identity,
    },
    RemoveUniqueIndex {
        table: TableName,
        identity: Identity,
    },
}

impl Operation {
    pub fn table(&self) -> &TableName {
        match self {
            Self::CreateTable { table }
            | Self::AddAttribute { table, .. }
            | Self::AlterAttribute { table, .. }
            | Self::RenameAttribute { table, .. }
            | Self::RemoveAttribute { table, .. }
            | Self::AddUniqueIndex { table, .. }
            | Self::RemoveUniqueIndex { table, .. } => table,
        }
    }

    /// True for the four operations the Phaser groups under a table's phase.
    pub fn is_attribute_level(&self) -> bool {
        matches!(
            self,
            Self::AddAttribute { .. } | Self::AlterAttribute { .. } | Self::RenameAttribute { .. } | Self::RemoveAttribute { .. }
        )
    }
}

/// A grouping of same-table operations that renders as one code block (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Create { table: TableName, operations: Vec<Operation> },
    Alter { table: TableName, operations: Vec<Operation> },
}

impl Phase {
    pub fn operations(&self) -> &[Operation] {
        match self {
            Self::Create { operations, .. } | Self::Alter { operations, .. } => operations,
        }
    }

    pub fn table(&self) -> &TableName {
        match self {
            Self::Create { table, .. } | Self::Alter { table, .. } => table,
        }
    }
}
