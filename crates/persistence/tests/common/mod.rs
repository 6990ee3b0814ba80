//! Shared helpers for integration tests: an in-memory unit-of-work engine
//! and manager builders.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use orm::{
    ColumnMetadata, ColumnType, Configuration, EngineError, Entity, EntityId, EntityMetadata,
    LockMode, MappingEngine, MetadataRegistry, SyncMode,
};
use persistence::{slow_query_metadata, ManagerSettings, ModelManager};

/// What the unit of work has staged but not flushed.
enum Staged {
    Insert(Entity),
    Delete(String, String),
}

/// In-memory engine with staged writes and snapshot transactions.
///
/// Close enough to a real mapping engine for end-to-end tests: writes stay
/// invisible until flushed, transactions roll back to the begin snapshot, and
/// a unique `hash` column is enforced with a SQLSTATE-style code.
pub struct MemoryEngine {
    committed: HashMap<String, HashMap<String, Entity>>,
    staged: Vec<Staged>,
    snapshot: Option<HashMap<String, HashMap<String, Entity>>>,
    created_tables: HashSet<String>,
    in_transaction: bool,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            committed: HashMap::new(),
            staged: Vec::new(),
            snapshot: None,
            created_tables: HashSet::new(),
            in_transaction: false,
        }
    }

    fn id_of(entity: &Entity) -> Result<String, EngineError> {
        entity
            .id()
            .map(EntityId::to_string)
            .ok_or_else(|| EngineError::orm("entity has no identifier"))
    }

    fn check_unique_hash(&self, entity: &Entity, id: &str) -> Result<(), EngineError> {
        let Some(hash) = entity.field("hash").and_then(|v| v.as_str()) else {
            return Ok(());
        };
        let rows = self.committed.get(entity.name());
        let duplicate = rows.is_some_and(|rows| {
            rows.iter().any(|(row_id, row)| {
                row_id != id && row.field("hash").and_then(|v| v.as_str()) == Some(hash)
            })
        });
        if duplicate {
            return Err(EngineError::orm_with_code(
                "duplicate key value violates unique constraint",
                "23505",
            ));
        }
        Ok(())
    }

    fn apply(&mut self, staged: Staged) -> Result<(), EngineError> {
        match staged {
            Staged::Insert(entity) => {
                let id = Self::id_of(&entity)?;
                self.check_unique_hash(&entity, &id)?;
                self.committed
                    .entry(entity.name().to_string())
                    .or_default()
                    .insert(id, entity);
            }
            Staged::Delete(name, id) => {
                if let Some(rows) = self.committed.get_mut(&name) {
                    rows.remove(&id);
                }
            }
        }
        Ok(())
    }
}

impl MappingEngine for MemoryEngine {
    fn persist(&mut self, entity: Entity) -> Result<(), EngineError> {
        Self::id_of(&entity)?;
        self.staged.push(Staged::Insert(entity));
        Ok(())
    }

    fn flush_all(&mut self) -> Result<(), EngineError> {
        for staged in std::mem::take(&mut self.staged) {
            self.apply(staged)?;
        }
        Ok(())
    }

    fn flush_entity(&mut self, entity: &Entity) -> Result<(), EngineError> {
        let id = Self::id_of(entity)?;
        let mut kept = Vec::new();
        for staged in std::mem::take(&mut self.staged) {
            let matches = match &staged {
                Staged::Insert(candidate) => {
                    candidate.name() == entity.name()
                        && candidate.id().map(EntityId::to_string) == Some(id.clone())
                }
                Staged::Delete(name, staged_id) => name == entity.name() && *staged_id == id,
            };
            if matches {
                self.apply(staged)?;
            } else {
                kept.push(staged);
            }
        }
        self.staged = kept;
        Ok(())
    }

    fn find(
        &mut self,
        entity: &str,
        id: &EntityId,
        lock: LockMode,
    ) -> Result<Option<Entity>, EngineError> {
        let needs_transaction =
            matches!(lock, LockMode::PessimisticRead | LockMode::PessimisticWrite);
        if needs_transaction && !self.in_transaction {
            return Err(EngineError::TransactionRequired {
                operation: "find".to_string(),
            });
        }
        Ok(self
            .committed
            .get(entity)
            .and_then(|rows| rows.get(&id.to_string()))
            .cloned())
    }

    fn remove(&mut self, entity: &Entity) -> Result<(), EngineError> {
        let id = Self::id_of(entity)?;
        self.staged
            .push(Staged::Delete(entity.name().to_string(), id));
        Ok(())
    }

    fn merge(&mut self, entity: Entity) -> Result<Entity, EngineError> {
        Self::id_of(&entity)?;
        self.staged.push(Staged::Insert(entity.clone()));
        Ok(entity)
    }

    fn refresh(&mut self, entity: &mut Entity) -> Result<(), EngineError> {
        let id = Self::id_of(entity)?;
        match self
            .committed
            .get(entity.name())
            .and_then(|rows| rows.get(&id))
        {
            Some(stored) => {
                entity.set_fields(stored.fields().clone());
                Ok(())
            }
            None => Err(EngineError::orm("cannot refresh an unmanaged entity")),
        }
    }

    fn detach_all(&mut self) -> Result<(), EngineError> {
        self.staged.clear();
        Ok(())
    }

    fn detach_named(&mut self, entity: &str) -> Result<(), EngineError> {
        self.staged.retain(|staged| match staged {
            Staged::Insert(candidate) => candidate.name() != entity,
            Staged::Delete(name, _) => name != entity,
        });
        Ok(())
    }

    fn copy(&mut self, entity: &Entity, _deep: bool) -> Result<Entity, EngineError> {
        let mut copied = Entity::new(entity.name());
        copied.set_fields(entity.fields().clone());
        Ok(copied)
    }

    fn begin(&mut self) -> Result<(), EngineError> {
        if self.in_transaction {
            return Err(EngineError::orm("transaction already open"));
        }
        self.snapshot = Some(self.committed.clone());
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), EngineError> {
        self.snapshot = None;
        self.in_transaction = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), EngineError> {
        if let Some(snapshot) = self.snapshot.take() {
            self.committed = snapshot;
        }
        self.staged.clear();
        self.in_transaction = false;
        Ok(())
    }

    fn schema_diff(&mut self, declared: &[EntityMetadata]) -> Result<Vec<String>, EngineError> {
        let mut statements = Vec::new();
        for metadata in declared {
            if self.created_tables.contains(&metadata.table) {
                continue;
            }
            let columns: Vec<String> = metadata
                .columns
                .iter()
                .map(|column| column.name.clone())
                .collect();
            statements.push(format!(
                "CREATE TABLE {} ({})",
                metadata.table,
                columns.join(", ")
            ));
            for index in &metadata.indexes {
                let unique = if index.unique { "UNIQUE " } else { "" };
                statements.push(format!(
                    "CREATE {}INDEX {} ON {} ({})",
                    unique,
                    index.name,
                    metadata.table,
                    index.columns.join(", ")
                ));
            }
        }
        Ok(statements)
    }

    fn apply_ddl(&mut self, statements: &[String], _mode: SyncMode) -> Result<(), EngineError> {
        for statement in statements {
            if let Some(rest) = statement.strip_prefix("CREATE TABLE ") {
                if let Some(table) = rest.split_whitespace().next() {
                    self.created_tables.insert(table.to_string());
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn declared_registry() -> MetadataRegistry {
    let mut registry = MetadataRegistry::new();
    registry.register(
        EntityMetadata::new("device", "devices")
            .with_column(ColumnMetadata::new("id", ColumnType::BigInt))
            .with_column(ColumnMetadata::new("label", ColumnType::VarChar(255)).nullable()),
    );
    registry.register(slow_query_metadata());
    registry
}

pub fn build_manager() -> ModelManager {
    build_manager_with(ManagerSettings::default())
}

pub fn build_manager_with(settings: ManagerSettings) -> ModelManager {
    let configuration = Arc::new(RwLock::new(Configuration::new(declared_registry())));
    ModelManager::new(Box::new(MemoryEngine::new()), configuration, settings)
}

pub fn device(id: i64, label: &str) -> Entity {
    Entity::new("device").with_id(id).with_field("label", label)
}
