//! The shared engine configuration object.

use std::fmt;
use std::sync::Arc;

use crate::cache::CacheBackend;
use crate::metadata::MetadataRegistry;

/// Proxy auto-generation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProxyMode {
    /// Regenerate proxies on every request. Development only.
    #[default]
    Always,
    /// Regenerate when the underlying definition changed. Production-safe.
    OnChange,
    Never,
}

/// Configuration shared between a façade instance and its engine.
///
/// There is exactly one configuration per façade instance; mutating it (cache
/// provisioning, proxy mode) retroactively affects all subsequent delegated
/// calls.
pub struct Configuration {
    metadata: MetadataRegistry,
    metadata_cache: Option<Arc<dyn CacheBackend>>,
    query_cache: Option<Arc<dyn CacheBackend>>,
    proxy_mode: ProxyMode,
}

impl Configuration {
    pub fn new(metadata: MetadataRegistry) -> Self {
        Self {
            metadata,
            metadata_cache: None,
            query_cache: None,
            proxy_mode: ProxyMode::default(),
        }
    }

    /// The declared entity metadata.
    pub fn metadata(&self) -> &MetadataRegistry {
        &self.metadata
    }

    pub fn metadata_cache(&self) -> Option<Arc<dyn CacheBackend>> {
        self.metadata_cache.clone()
    }

    pub fn set_metadata_cache(&mut self, cache: Option<Arc<dyn CacheBackend>>) {
        self.metadata_cache = cache;
    }

    pub fn query_cache(&self) -> Option<Arc<dyn CacheBackend>> {
        self.query_cache.clone()
    }

    pub fn set_query_cache(&mut self, cache: Option<Arc<dyn CacheBackend>>) {
        self.query_cache = cache;
    }

    pub fn proxy_mode(&self) -> ProxyMode {
        self.proxy_mode
    }

    pub fn set_proxy_mode(&mut self, mode: ProxyMode) {
        self.proxy_mode = mode;
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("declared_entities", &self.metadata.len())
            .field("metadata_cache", &self.metadata_cache.is_some())
            .field("query_cache", &self.query_cache.is_some())
            .field("proxy_mode", &self.proxy_mode)
            .finish()
    }
}
