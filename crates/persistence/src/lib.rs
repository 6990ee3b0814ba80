//! Managed persistence façade.
//!
//! This crate contains:
//! - The [`ModelManager`] entry point wrapping an injected mapping engine
//! - The façade failure taxonomy and engine-error translation
//! - Cache provisioning and schema synchronization
//! - Repository lookup and the slow-query log
//!
//! Callers only ever talk to the manager; every engine failure is piped
//! through translation before it surfaces, so application code handles
//! exactly one error type.

mod cache;
pub mod error;
pub mod logging;
pub mod manager;
pub mod metrics;
pub mod proxy;
pub mod query_log;
pub mod repository;
pub mod schema;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_engine;

pub use error::ManagerError;
pub use manager::{ClearScope, ModelManager};
pub use proxy::LazyReference;
pub use query_log::{
    slow_query_metadata, SlowQueryLog, SlowQueryRecord, SlowQueryRepository, SLOW_QUERY_ENTITY,
};
pub use repository::{GenericRepository, Repository, RepositoryFactory, RepositoryRegistry};
pub use schema::{SchemaSyncReport, SchemaSynchronizer};
pub use settings::ManagerSettings;
