//! Compiled Query Cache
//!
//! Compiled queries depend only on the query text, so they are cached by
//! that text and shared via `Arc`. The process-wide cache is unbounded:
//! the set of distinct queries a program uses is small and static. Bounded
//! caches evict least-recently-used entries.

use std::num::NonZeroUsize;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use lru::LruCache;

use super::compiler::CompiledQuery;
use crate::Result;

static GLOBAL: LazyLock<Arc<QueryCache>> = LazyLock::new(|| Arc::new(QueryCache::unbounded()));

/// Thread-safe cache of compiled path queries
pub struct QueryCache {
    entries: Mutex<LruCache<String, Arc<CompiledQuery>>>,
}

impl QueryCache {
    pub fn unbounded() -> Self {
        Self {
            entries: Mutex::new(LruCache::unbounded()),
        }
    }

    pub fn bounded(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Shared process-wide cache
    pub fn global() -> Arc<QueryCache> {
        Arc::clone(&GLOBAL)
    }

    /// Return the cached matcher for `query`, compiling it on a miss.
    ///
    /// Compilation runs outside the lock; two threads missing on the same
    /// key both compile and the later insert wins. Failures are not cached.
    pub fn get_or_compile(&self, query: &str) -> Result<Arc<CompiledQuery>> {
        if let Some(hit) = self.lock().get(query) {
            tracing::trace!(query, "query cache hit");
            return Ok(Arc::clone(hit));
        }

        let compiled = Arc::new(CompiledQuery::compile(query)?);
        let size = {
            let mut entries = self.lock();
            entries.put(query.to_string(), Arc::clone(&compiled));
            entries.len()
        };
        tracing::debug!(query, steps = compiled.steps().len(), size, "compiled path query");
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of entries; `usize::MAX` when unbounded
    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // Entries are immutable once inserted, so a poisoned lock still guards
    // a consistent map.
    fn lock(&self) -> MutexGuard<'_, LruCache<String, Arc<CompiledQuery>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
