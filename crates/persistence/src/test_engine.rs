//! Scripted engine double for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use orm::{
    Configuration, EngineError, Entity, EntityId, EntityMetadata, LockMode, MappingEngine,
    MetadataRegistry, SyncMode,
};

use crate::manager::ModelManager;
use crate::settings::ManagerSettings;

/// Call-recording engine with scriptable failures and a trivial store.
///
/// Each scripted failure fires once, on the first call of the named
/// operation; the call log is shared so tests keep a handle after the engine
/// moves into the manager.
pub struct RecordingEngine {
    calls: Arc<Mutex<Vec<String>>>,
    failures: HashMap<String, EngineError>,
    store: HashMap<(String, String), Entity>,
    scripted_diff: Vec<String>,
    applied: Arc<Mutex<Vec<(Vec<String>, SyncMode)>>>,
    in_transaction: bool,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            failures: HashMap::new(),
            store: HashMap::new(),
            scripted_diff: Vec::new(),
            applied: Arc::new(Mutex::new(Vec::new())),
            in_transaction: false,
        }
    }

    /// Seeds the store with a committed entity. The entity needs an id.
    pub fn with_entity(mut self, entity: Entity) -> Self {
        let id = entity.id().expect("seeded entity needs an id").to_string();
        self.store.insert((entity.name().to_string(), id), entity);
        self
    }

    /// Scripts `err` for the next call of `op`.
    pub fn failing_on(mut self, op: &str, err: EngineError) -> Self {
        self.failures.insert(op.to_string(), err);
        self
    }

    pub fn with_diff(mut self, statements: Vec<String>) -> Self {
        self.scripted_diff = statements;
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }

    pub fn applied(&self) -> Arc<Mutex<Vec<(Vec<String>, SyncMode)>>> {
        Arc::clone(&self.applied)
    }

    fn note(&mut self, op: &str) -> Result<(), EngineError> {
        self.calls.lock().unwrap().push(op.to_string());
        let key = op.split(':').next().unwrap_or(op);
        match self.failures.remove(key) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn store_key(entity: &Entity) -> Option<(String, String)> {
        entity
            .id()
            .map(|id| (entity.name().to_string(), id.to_string()))
    }
}

impl MappingEngine for RecordingEngine {
    fn persist(&mut self, entity: Entity) -> Result<(), EngineError> {
        self.note("persist")?;
        if let Some(key) = Self::store_key(&entity) {
            self.store.insert(key, entity);
        }
        Ok(())
    }

    fn flush_all(&mut self) -> Result<(), EngineError> {
        self.note("flush_all")
    }

    fn flush_entity(&mut self, _entity: &Entity) -> Result<(), EngineError> {
        self.note("flush_entity")
    }

    fn find(
        &mut self,
        entity: &str,
        id: &EntityId,
        lock: LockMode,
    ) -> Result<Option<Entity>, EngineError> {
        self.note("find")?;
        let needs_transaction =
            matches!(lock, LockMode::PessimisticRead | LockMode::PessimisticWrite);
        if needs_transaction && !self.in_transaction {
            return Err(EngineError::TransactionRequired {
                operation: "find".to_string(),
            });
        }
        Ok(self
            .store
            .get(&(entity.to_string(), id.to_string()))
            .cloned())
    }

    fn remove(&mut self, entity: &Entity) -> Result<(), EngineError> {
        self.note("remove")?;
        if let Some(key) = Self::store_key(entity) {
            self.store.remove(&key);
        }
        Ok(())
    }

    fn merge(&mut self, entity: Entity) -> Result<Entity, EngineError> {
        self.note("merge")?;
        if let Some(key) = Self::store_key(&entity) {
            self.store.insert(key, entity.clone());
        }
        Ok(entity)
    }

    fn refresh(&mut self, entity: &mut Entity) -> Result<(), EngineError> {
        self.note("refresh")?;
        let key = Self::store_key(entity).ok_or_else(|| {
            EngineError::orm("cannot refresh an entity without an identifier")
        })?;
        match self.store.get(&key) {
            Some(stored) => {
                entity.set_fields(stored.fields().clone());
                Ok(())
            }
            None => Err(EngineError::orm("cannot refresh an unmanaged entity")),
        }
    }

    fn detach_all(&mut self) -> Result<(), EngineError> {
        self.note("detach_all")
    }

    fn detach_named(&mut self, entity: &str) -> Result<(), EngineError> {
        self.note(&format!("detach_named:{entity}"))
    }

    fn copy(&mut self, entity: &Entity, _deep: bool) -> Result<Entity, EngineError> {
        self.note("copy")?;
        Ok(entity.clone())
    }

    fn begin(&mut self) -> Result<(), EngineError> {
        self.note("begin")?;
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), EngineError> {
        self.note("commit")?;
        self.in_transaction = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), EngineError> {
        self.note("rollback")?;
        self.in_transaction = false;
        Ok(())
    }

    fn schema_diff(&mut self, _declared: &[EntityMetadata]) -> Result<Vec<String>, EngineError> {
        self.note("schema_diff")?;
        Ok(self.scripted_diff.clone())
    }

    fn apply_ddl(&mut self, statements: &[String], mode: SyncMode) -> Result<(), EngineError> {
        self.note("apply_ddl")?;
        self.applied.lock().unwrap().push((statements.to_vec(), mode));
        Ok(())
    }
}

/// Builds a manager over `engine` with default settings, handing back the
/// shared call log.
pub fn manager_with_engine(
    engine: RecordingEngine,
    metadata: MetadataRegistry,
) -> (ModelManager, Arc<Mutex<Vec<String>>>) {
    let calls = engine.calls();
    let configuration = Arc::new(RwLock::new(Configuration::new(metadata)));
    let manager = ModelManager::new(
        Box::new(engine),
        configuration,
        ManagerSettings::default(),
    );
    (manager, calls)
}
