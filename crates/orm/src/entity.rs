//! Dynamic entity records exchanged with the mapping engine.

use std::fmt;

use serde_json::{Map, Value};
use uuid::Uuid;

/// Primary-key value of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityId {
    Int(i64),
    Uuid(Uuid),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(value) => write!(f, "{value}"),
            EntityId::Uuid(value) => write!(f, "{value}"),
            EntityId::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        EntityId::Int(value)
    }
}

impl From<Uuid> for EntityId {
    fn from(value: Uuid) -> Self {
        EntityId::Uuid(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId::Text(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        EntityId::Text(value)
    }
}

/// A dynamic record managed by the mapping engine.
///
/// The record itself is a plain value: the entity type name, an optional
/// primary key, and a field map. Managed or detached *state* is tracked by
/// the engine's unit of work, never on this value.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    name: String,
    id: Option<EntityId>,
    fields: Map<String, Value>,
}

impl Entity {
    /// Creates an empty record of the given entity type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            fields: Map::new(),
        }
    }

    /// Sets the primary key, builder-style.
    pub fn with_id(mut self, id: impl Into<EntityId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets one field, builder-style.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// The entity type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    pub fn set_id(&mut self, id: impl Into<EntityId>) {
        self.id = Some(id.into());
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Replaces the whole field map, keeping name and id.
    pub fn set_fields(&mut self, fields: Map<String, Value>) {
        self.fields = fields;
    }
}
