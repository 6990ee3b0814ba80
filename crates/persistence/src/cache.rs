//! Cache provisioning for the shared configuration.
//!
//! One policy, applied at startup or maintenance time: install the provider
//! as both the metadata cache and the query-plan cache under a deterministic
//! namespace, and switch proxy generation to the production-safe mode. A
//! missing provider degrades loudly but keeps the manager functional.

use std::sync::{Arc, RwLock};

use orm::{CacheBackend, Configuration, ProxyMode};
use tracing::{debug, warn};

use crate::settings::ManagerSettings;

/// Deterministic namespace for this façade deployment.
///
/// Derived from the package identity (or the configured seed), so cache keys
/// never collide across unrelated deployments sharing one backend, and
/// repeated calls in one process always agree.
pub(crate) fn facade_namespace(settings: &ManagerSettings) -> String {
    let seed = match &settings.cache.namespace_seed {
        Some(seed) => seed.clone(),
        None => format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
    };
    shared::digest::namespace_token(&seed)
}

/// Applies the provisioning policy to the shared configuration.
pub(crate) fn provision(
    configuration: &RwLock<Configuration>,
    provider: Option<Arc<dyn CacheBackend>>,
    settings: &ManagerSettings,
) {
    let mut config = configuration.write().unwrap_or_else(|e| e.into_inner());

    match provider {
        Some(backend) => {
            let namespace = facade_namespace(settings);
            backend.set_namespace(&namespace);
            config.set_metadata_cache(Some(Arc::clone(&backend)));
            config.set_query_cache(Some(backend));
            debug!(%namespace, "cache backend installed for metadata and query plans");
        }
        None => {
            config.set_metadata_cache(None);
            config.set_query_cache(None);
            warn!(
                "no cache backend configured; metadata and query-plan lookups will hit the \
                 engine every time. Consider wiring orm::MemoryCache or a shared backend."
            );
        }
    }

    config.set_proxy_mode(ProxyMode::OnChange);
}
