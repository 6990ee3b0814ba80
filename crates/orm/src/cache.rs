//! Cache backend capability and the bundled in-memory implementation.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

/// Shared metadata/query-plan cache capability.
///
/// Entries are stored under the active namespace; switching the namespace
/// isolates previously written keys. Absence of any backend is a supported,
/// degraded configuration, not a failure.
pub trait CacheBackend: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    fn set(&self, key: &str, value: Vec<u8>);

    fn set_namespace(&self, namespace: &str);

    fn namespace(&self) -> String;
}

/// Bounded in-memory backend for development and tests.
pub struct MemoryCache {
    inner: Mutex<MemoryCacheInner>,
}

struct MemoryCacheInner {
    entries: LruCache<String, Vec<u8>>,
    namespace: String,
}

impl MemoryCache {
    /// Creates a cache holding at most `capacity` entries (minimum one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(MemoryCacheInner {
                entries: LruCache::new(capacity),
                namespace: String::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryCacheInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn scoped(namespace: &str, key: &str) -> String {
        format!("{namespace}:{key}")
    }
}

impl CacheBackend for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut inner = self.lock();
        let scoped = Self::scoped(&inner.namespace, key);
        inner.entries.get(&scoped).cloned()
    }

    fn set(&self, key: &str, value: Vec<u8>) {
        let mut inner = self.lock();
        let scoped = Self::scoped(&inner.namespace, key);
        inner.entries.put(scoped, value);
    }

    fn set_namespace(&self, namespace: &str) {
        self.lock().namespace = namespace.to_string();
    }

    fn namespace(&self) -> String {
        self.lock().namespace.clone()
    }
}
