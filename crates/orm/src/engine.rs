//! Capability contract of the object-relational mapping engine.

use crate::entity::{Entity, EntityId};
use crate::error::EngineError;
use crate::metadata::EntityMetadata;

/// Lock requested for a primary-key load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockMode {
    #[default]
    None,
    /// Verify the expected version on load; `None` reads the current one.
    Optimistic { version: Option<i64> },
    PessimisticRead,
    PessimisticWrite,
}

/// How schema synchronization applies a non-empty diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Only add missing structures.
    Additive,
    /// May drop and recreate conflicting structures.
    Destructive,
}

/// The unit-of-work engine the façade delegates to.
///
/// Every call is synchronous and blocking. Implementations are not expected
/// to be thread-safe: one unit of work per engine, mutating calls serialized
/// by the caller.
pub trait MappingEngine: Send {
    /// Registers an entity for insertion on the next flush.
    fn persist(&mut self, entity: Entity) -> Result<(), EngineError>;

    /// Synchronizes every pending unit-of-work change to storage.
    fn flush_all(&mut self) -> Result<(), EngineError>;

    /// Synchronizes pending changes for one entity only.
    fn flush_entity(&mut self, entity: &Entity) -> Result<(), EngineError>;

    /// Loads one entity by primary key. Absence is `Ok(None)`.
    fn find(
        &mut self,
        entity: &str,
        id: &EntityId,
        lock: LockMode,
    ) -> Result<Option<Entity>, EngineError>;

    /// Marks an entity for deletion on the next flush.
    fn remove(&mut self, entity: &Entity) -> Result<(), EngineError>;

    /// Reconciles a detached entity into the unit of work, returning the
    /// managed copy.
    fn merge(&mut self, entity: Entity) -> Result<Entity, EngineError>;

    /// Reloads the entity's state from storage, discarding unflushed local
    /// changes.
    fn refresh(&mut self, entity: &mut Entity) -> Result<(), EngineError>;

    /// Detaches every tracked entity.
    fn detach_all(&mut self) -> Result<(), EngineError>;

    /// Detaches tracked entities of one type.
    fn detach_named(&mut self, entity: &str) -> Result<(), EngineError>;

    /// Produces a new, unmanaged copy of an entity graph.
    fn copy(&mut self, entity: &Entity, deep: bool) -> Result<Entity, EngineError>;

    fn begin(&mut self) -> Result<(), EngineError>;

    fn commit(&mut self) -> Result<(), EngineError>;

    fn rollback(&mut self) -> Result<(), EngineError>;

    /// DDL statements needed to bring live storage into agreement with the
    /// declared metadata. Empty means the schema is current.
    fn schema_diff(&mut self, declared: &[EntityMetadata]) -> Result<Vec<String>, EngineError>;

    /// Applies previously computed DDL statements.
    fn apply_ddl(&mut self, statements: &[String], mode: SyncMode) -> Result<(), EngineError>;
}
