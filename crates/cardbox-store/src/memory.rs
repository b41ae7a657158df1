use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use cardbox_types::ComponentHash;

use crate::canonical::StoredComponent;
use crate::error::{StoreError, StoreResult};
use crate::traits::ComponentStore;

/// In-memory, HashMap-based component store.
///
/// Intended for tests and embedding. Entries are cloned on read and write.
pub struct InMemoryComponentStore {
    components: RwLock<HashMap<ComponentHash, StoredComponent>>,
}

impl InMemoryComponentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            components: RwLock::new(HashMap::new()),
        }
    }

    fn map(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<ComponentHash, StoredComponent>>> {
        self.components
            .read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    fn map_mut(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<ComponentHash, StoredComponent>>> {
        self.components
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    /// Number of stored components.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.map()?.len())
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.map()?.is_empty())
    }

    /// Remove every entry.
    pub fn clear(&self) -> StoreResult<()> {
        self.map_mut()?.clear();
        Ok(())
    }

    /// Sorted list of all stored hashes.
    pub fn all_hashes(&self) -> StoreResult<Vec<ComponentHash>> {
        let mut hashes: Vec<ComponentHash> = self.map()?.keys().copied().collect();
        hashes.sort();
        Ok(hashes)
    }
}

impl Default for InMemoryComponentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentStore for InMemoryComponentStore {
    fn read(&self, hash: &ComponentHash) -> StoreResult<Option<StoredComponent>> {
        Ok(self.map()?.get(hash).cloned())
    }

    fn write(&self, hash: &ComponentHash, stored: &StoredComponent) -> StoreResult<bool> {
        let mut map = self.map_mut()?;
        if map.contains_key(hash) {
            return Ok(false);
        }
        map.insert(*hash, stored.clone());
        Ok(true)
    }

    fn exists(&self, hash: &ComponentHash) -> StoreResult<bool> {
        Ok(self.map()?.contains_key(hash))
    }

    fn delete(&self, hash: &ComponentHash) -> StoreResult<bool> {
        Ok(self.map_mut()?.remove(hash).is_some())
    }
}

impl std::fmt::Debug for InMemoryComponentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryComponentStore")
            .field("component_count", &self.len().ok())
            .finish()
    }
}
