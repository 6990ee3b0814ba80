//! Declarative entity-to-table metadata.
//!
//! Metadata is opaque input from the embedding application's point of view:
//! the façade only ever asks which entity types are declared and hands the
//! full set to the engine for schema synchronization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Storage type of a mapped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    BigInt,
    Double,
    Text,
    VarChar(u32),
    Boolean,
    TimestampTz,
    Uuid,
}

/// One mapped column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub unique: bool,
}

impl ColumnMetadata {
    /// A non-nullable, non-unique column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            unique: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// One declared index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl IndexMetadata {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Declared mapping of one entity type onto a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub entity: String,
    pub table: String,
    pub columns: Vec<ColumnMetadata>,
    pub indexes: Vec<IndexMetadata>,
}

impl EntityMetadata {
    pub fn new(entity: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            table: table.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: ColumnMetadata) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_index(mut self, index: IndexMetadata) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// The set of declared entity metadata known to a configuration.
///
/// Resolving loadability against this registry is what lets the façade fail
/// fast on unknown type names without touching the engine.
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    entries: BTreeMap<String, EntityMetadata>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares one entity, replacing any previous declaration of the name.
    pub fn register(&mut self, metadata: EntityMetadata) {
        self.entries.insert(metadata.entity.clone(), metadata);
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.entries.contains_key(entity)
    }

    pub fn get(&self, entity: &str) -> Option<&EntityMetadata> {
        self.entries.get(entity)
    }

    /// Like [`get`](Self::get), but missing names are a metadata-resolution
    /// failure.
    pub fn require(&self, entity: &str) -> Result<&EntityMetadata, EngineError> {
        self.entries
            .get(entity)
            .ok_or_else(|| EngineError::UnknownEntity {
                entity: entity.to_string(),
            })
    }

    /// The full declared set, in stable name order.
    pub fn all(&self) -> Vec<EntityMetadata> {
        self.entries.values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
