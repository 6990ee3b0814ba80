//! Repository lookup: a registry of per-entity factories with a generic
//! fallback.

use std::collections::HashMap;

use orm::{Entity, EntityId, EntityMetadata, LockMode};

use crate::error::ManagerError;
use crate::manager::ModelManager;

/// A repository bound to one entity type's resolved metadata.
///
/// Repositories are cheap values constructed per lookup; state lives in the
/// manager they operate through.
pub trait Repository {
    fn metadata(&self) -> &EntityMetadata;

    fn entity_name(&self) -> &str {
        &self.metadata().entity
    }

    /// Loads one entity of this repository's type by primary key.
    fn find(
        &self,
        manager: &mut ModelManager,
        id: &EntityId,
    ) -> Result<Option<Entity>, ManagerError> {
        manager.find(self.entity_name(), id, LockMode::None)
    }
}

impl std::fmt::Debug for dyn Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &self.entity_name())
            .finish()
    }
}

/// Fallback repository used when no custom factory is registered.
pub struct GenericRepository {
    metadata: EntityMetadata,
}

impl GenericRepository {
    pub fn new(metadata: EntityMetadata) -> Self {
        Self { metadata }
    }
}

impl Repository for GenericRepository {
    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }
}

/// Constructor capability for custom repositories.
pub type RepositoryFactory = Box<dyn Fn(EntityMetadata) -> Box<dyn Repository> + Send + Sync>;

/// Maps entity type names to custom repository constructors.
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: HashMap<String, RepositoryFactory>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` for `entity`, replacing any previous entry.
    pub fn register(&mut self, entity: impl Into<String>, factory: RepositoryFactory) {
        self.factories.insert(entity.into(), factory);
    }

    pub fn has_custom(&self, entity: &str) -> bool {
        self.factories.contains_key(entity)
    }

    /// Constructs the repository for the metadata's entity type: the
    /// registered factory when one exists, the generic fallback otherwise.
    pub fn build(&self, metadata: EntityMetadata) -> Box<dyn Repository> {
        match self.factories.get(&metadata.entity) {
            Some(factory) => factory(metadata),
            None => Box::new(GenericRepository::new(metadata)),
        }
    }
}
