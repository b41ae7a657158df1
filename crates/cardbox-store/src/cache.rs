use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use cardbox_types::ComponentHash;
use lru::LruCache;
use tracing::debug;

use crate::canonical::StoredComponent;
use crate::error::{StoreError, StoreResult};
use crate::traits::ComponentStore;

/// Entries kept by [`CachedComponentStore::new`].
pub const DEFAULT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1024) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// Hit/miss counters of a [`CachedComponentStore`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Bounded read-through cache of stored forms in front of another store.
///
/// Holds at most `capacity` decoded forms and evicts the least recently
/// used. A hit is served only after the wrapped store confirms the hash is
/// still present, so a component removed underneath the cache reads as
/// absent. What the cache saves is the fetch and decode of the form.
pub struct CachedComponentStore<S> {
    inner: S,
    cache: Mutex<LruCache<ComponentHash, StoredComponent>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<S: ComponentStore> CachedComponentStore<S> {
    pub fn new(inner: S) -> Self {
        Self::with_capacity(inner, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(inner: S, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    pub fn capacity(&self) -> StoreResult<NonZeroUsize> {
        Ok(self.lock()?.cap())
    }

    pub fn stats(&self) -> StoreResult<CacheStats> {
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.lock()?.len(),
        })
    }

    /// Drop every cached entry. The wrapped store is untouched.
    pub fn evict_all(&self) -> StoreResult<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, LruCache<ComponentHash, StoredComponent>>> {
        self.cache
            .lock()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    fn cached(&self, hash: &ComponentHash) -> StoreResult<Option<StoredComponent>> {
        Ok(self.lock()?.get(hash).cloned())
    }

    fn remember(&self, hash: &ComponentHash, stored: &StoredComponent) -> StoreResult<()> {
        let mut cache = self.lock()?;
        if !cache.contains(hash) {
            cache.put(*hash, stored.clone());
        }
        Ok(())
    }

    fn forget(&self, hash: &ComponentHash) -> StoreResult<()> {
        self.lock()?.pop(hash);
        Ok(())
    }
}

impl<S: ComponentStore> ComponentStore for CachedComponentStore<S> {
    fn read(&self, hash: &ComponentHash) -> StoreResult<Option<StoredComponent>> {
        if let Some(stored) = self.cached(hash)? {
            if self.inner.exists(hash)? {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Some(stored));
            }
            debug!(hash = %hash.short_hex(), "cached component gone from backend");
            self.forget(hash)?;
            return Ok(None);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(hash = %hash.short_hex(), "cache miss");
        let stored = self.inner.read(hash)?;
        if let Some(stored) = &stored {
            self.remember(hash, stored)?;
        }
        Ok(stored)
    }

    fn write(&self, hash: &ComponentHash, stored: &StoredComponent) -> StoreResult<bool> {
        let written = self.inner.write(hash, stored)?;
        self.remember(hash, stored)?;
        Ok(written)
    }

    fn exists(&self, hash: &ComponentHash) -> StoreResult<bool> {
        self.inner.exists(hash)
    }

    fn delete(&self, hash: &ComponentHash) -> StoreResult<bool> {
        self.forget(hash)?;
        self.inner.delete(hash)
    }
}

impl<S> std::fmt::Debug for CachedComponentStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedComponentStore")
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}
