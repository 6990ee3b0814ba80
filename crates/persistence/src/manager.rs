//! The managed persistence entry point.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard};

use orm::{CacheBackend, Configuration, Entity, EntityId, LockMode, MappingEngine, SyncMode};
use tracing::error;

use crate::cache;
use crate::error::ManagerError;
use crate::metrics::StatementTimer;
use crate::proxy::LazyReference;
use crate::repository::{Repository, RepositoryFactory, RepositoryRegistry};
use crate::schema::{SchemaSyncReport, SchemaSynchronizer};
use crate::settings::ManagerSettings;

/// Scope of a [`ModelManager::clear`] call.
pub enum ClearScope<'a> {
    /// Detach every tracked entity.
    All,
    /// Detach tracked entities of one declared type.
    Entity(&'a str),
    /// Detach tracked entities of the instance's type.
    Instance(&'a Entity),
}

/// Single entry point for all persistence operations.
///
/// The manager owns an injected [`MappingEngine`] and delegates every
/// operation to it, piping failures through translation so callers only ever
/// see [`ManagerError`]. One unit of work per manager: mutating operations
/// take `&mut self` and must not be interleaved across threads without
/// external synchronization.
pub struct ModelManager {
    engine: Box<dyn MappingEngine>,
    configuration: Arc<RwLock<Configuration>>,
    settings: ManagerSettings,
    repositories: RepositoryRegistry,
    cache_dir: OnceLock<PathBuf>,
    in_transaction: bool,
}

impl std::fmt::Debug for ModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelManager")
            .field("settings", &self.settings)
            .field("in_transaction", &self.in_transaction)
            .finish_non_exhaustive()
    }
}

impl ModelManager {
    /// Wraps `engine` with the configuration instance it was built against.
    ///
    /// The configuration is shared, not copied: mutating it later (cache
    /// provisioning, proxy mode) affects all subsequent delegated calls.
    pub fn new(
        engine: Box<dyn MappingEngine>,
        configuration: Arc<RwLock<Configuration>>,
        settings: ManagerSettings,
    ) -> Self {
        Self {
            engine,
            configuration,
            settings,
            repositories: RepositoryRegistry::new(),
            cache_dir: OnceLock::new(),
            in_transaction: false,
        }
    }

    /// The one configuration instance shared with the engine.
    pub fn configuration(&self) -> Arc<RwLock<Configuration>> {
        Arc::clone(&self.configuration)
    }

    pub fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    fn config_read(&self) -> RwLockReadGuard<'_, Configuration> {
        self.configuration.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Fails fast when `entity` is not a declared, loadable type. Runs before
    /// anything reaches the engine.
    fn ensure_declared(&self, entity: &str) -> Result<(), ManagerError> {
        if self.config_read().metadata().contains(entity) {
            Ok(())
        } else {
            Err(ManagerError::invalid_argument(entity))
        }
    }

    /// Stages `entity` for insertion on the next flush.
    pub fn persist(&mut self, entity: Entity) -> Result<&mut Self, ManagerError> {
        self.engine.persist(entity)?;
        Ok(self)
    }

    /// Synchronizes every pending unit-of-work change to storage.
    pub fn flush_all(&mut self) -> Result<&mut Self, ManagerError> {
        let timer = StatementTimer::new("flush");
        let outcome = self.engine.flush_all();
        timer.record();
        outcome?;
        Ok(self)
    }

    /// Synchronizes pending changes for `entity` only.
    ///
    /// Narrower than [`flush_all`](Self::flush_all): changes staged for other
    /// entities stay pending. Prefer the full flush unless partial
    /// synchronization is the point.
    pub fn flush_scoped(&mut self, entity: &Entity) -> Result<&mut Self, ManagerError> {
        let timer = StatementTimer::new("flush_scoped");
        let outcome = self.engine.flush_entity(entity);
        timer.record();
        outcome?;
        Ok(self)
    }

    /// Loads one entity by primary key, optionally under a lock.
    ///
    /// Absence is `Ok(None)`, not an error. Lock modes that demand an active
    /// transaction fail through the engine when none is open.
    pub fn find(
        &mut self,
        entity: &str,
        id: &EntityId,
        lock: LockMode,
    ) -> Result<Option<Entity>, ManagerError> {
        self.ensure_declared(entity)?;
        let timer = StatementTimer::new("find");
        let outcome = self.engine.find(entity, id, lock);
        timer.record();
        Ok(outcome?)
    }

    /// Marks an entity for deletion on the next flush.
    pub fn remove(&mut self, entity: &Entity) -> Result<&mut Self, ManagerError> {
        self.engine.remove(entity)?;
        Ok(self)
    }

    /// Reconciles a detached entity into the unit of work and returns the
    /// managed copy.
    pub fn merge(&mut self, entity: Entity) -> Result<Entity, ManagerError> {
        Ok(self.engine.merge(entity)?)
    }

    /// Detaches entities per `scope`. An instance clears exactly what its
    /// type name would.
    pub fn clear(&mut self, scope: ClearScope<'_>) -> Result<&mut Self, ManagerError> {
        match scope {
            ClearScope::All => self.engine.detach_all()?,
            ClearScope::Entity(name) => self.engine.detach_named(name)?,
            ClearScope::Instance(entity) => {
                let name = entity.name().to_owned();
                self.engine.detach_named(&name)?;
            }
        }
        Ok(self)
    }

    /// Reloads the entity's state from storage, discarding unflushed local
    /// changes. Takes effect immediately, unlike the staged mutations.
    pub fn refresh(&mut self, entity: &mut Entity) -> Result<&mut Self, ManagerError> {
        self.engine.refresh(entity)?;
        Ok(self)
    }

    /// Produces a new, unmanaged copy of the entity graph.
    pub fn copy(&mut self, entity: &Entity, deep: bool) -> Result<Entity, ManagerError> {
        Ok(self.engine.copy(entity, deep)?)
    }

    /// Returns a lazy reference to the entity without loading it.
    ///
    /// Same precondition as [`find`](Self::find): the type name must be
    /// declared. No engine call happens until the reference is resolved.
    pub fn get_reference(
        &self,
        entity: &str,
        id: EntityId,
    ) -> Result<LazyReference, ManagerError> {
        self.ensure_declared(entity)?;
        Ok(LazyReference::new(entity, id))
    }

    /// Registers a custom repository constructor for one entity type.
    pub fn register_repository(&mut self, entity: impl Into<String>, factory: RepositoryFactory) {
        self.repositories.register(entity, factory);
    }

    /// Builds the repository for `entity`, bound to its resolved metadata.
    ///
    /// The registered custom factory wins; otherwise the generic repository
    /// is returned. Metadata resolution failure surfaces as the translated
    /// metadata error of the underlying lookup.
    pub fn repository(&self, entity: &str) -> Result<Box<dyn Repository>, ManagerError> {
        let metadata = self.config_read().metadata().require(entity)?.clone();
        Ok(self.repositories.build(metadata))
    }

    /// Runs `work` inside a single transaction.
    ///
    /// Commits and returns the work's value unchanged on success; on *any*
    /// failure the transaction is rolled back before one `Persistence` error
    /// surfaces, whether the cause came from the engine or from the work
    /// itself. One logical unit of work at a time: a nested call fails
    /// without a second `begin` reaching the engine.
    pub fn transactional<T>(
        &mut self,
        work: impl FnOnce(&mut Self) -> anyhow::Result<T>,
    ) -> Result<T, ManagerError> {
        if self.in_transaction {
            return Err(ManagerError::persistence(
                "a transaction is already active on this manager",
            ));
        }

        self.engine.begin()?;
        self.in_transaction = true;
        let outcome = work(self);
        self.in_transaction = false;

        match outcome {
            Ok(value) => match self.engine.commit() {
                Ok(()) => Ok(value),
                Err(commit_err) => {
                    self.rollback_after_failure();
                    Err(ManagerError::from(commit_err))
                }
            },
            Err(work_err) => {
                self.rollback_after_failure();
                Err(ManagerError::from_work_failure(work_err))
            }
        }
    }

    fn rollback_after_failure(&mut self) {
        if let Err(rollback_err) = self.engine.rollback() {
            error!(error = %rollback_err, "rollback failed after transactional failure");
        }
    }

    /// Installs `provider` as both the metadata and query-plan cache, under a
    /// deterministic namespace, and switches proxy generation to the
    /// production-safe mode. Without a provider the proxy mode is still set
    /// and a degraded-configuration warning is emitted.
    pub fn set_cache(&self, provider: Option<Arc<dyn CacheBackend>>) {
        cache::provision(&self.configuration, provider, &self.settings);
    }

    /// Synchronizes the live schema with the declared metadata.
    ///
    /// A no-op unless `invalidate` is set; see [`SchemaSynchronizer`].
    pub fn sync_schema(
        &mut self,
        mode: SyncMode,
        invalidate: bool,
    ) -> Result<SchemaSyncReport, ManagerError> {
        SchemaSynchronizer::new(self.engine.as_mut(), &self.configuration)
            .synchronize(mode, invalidate)
    }

    /// Path of the on-disk cache directory for this manager.
    ///
    /// Computed once on first access and identical for the instance's
    /// lifetime. Creating the directory is left to the deployment tooling.
    pub fn cache_directory(&self) -> &Path {
        self.cache_dir.get_or_init(|| {
            let token = cache::facade_namespace(&self.settings);
            self.settings.cache.dir.join(format!("orm-{token}"))
        })
    }
}
