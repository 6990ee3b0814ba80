//! Lazy entity references.

use std::cell::OnceCell;

use orm::{Entity, EntityId, LockMode};

use crate::error::ManagerError;
use crate::manager::ModelManager;

/// Placeholder for an entity that has not been loaded from storage yet.
///
/// The first [`resolve`](Self::resolve) performs the lookup through the
/// manager; later calls return the memoized outcome, including a memoized
/// absence.
#[derive(Debug)]
pub struct LazyReference {
    entity: String,
    id: EntityId,
    resolved: OnceCell<Option<Entity>>,
}

impl LazyReference {
    pub(crate) fn new(entity: &str, id: EntityId) -> Self {
        Self {
            entity: entity.to_string(),
            id,
            resolved: OnceCell::new(),
        }
    }

    pub fn entity_name(&self) -> &str {
        &self.entity
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// Loads the referenced entity on first call, memoizing the outcome.
    pub fn resolve(
        &self,
        manager: &mut ModelManager,
    ) -> Result<Option<&Entity>, ManagerError> {
        if self.resolved.get().is_none() {
            let loaded = manager.find(&self.entity, &self.id, LockMode::None)?;
            let _ = self.resolved.set(loaded);
        }
        Ok(self.resolved.get().and_then(|loaded| loaded.as_ref()))
    }
}
