use cardbox_types::ComponentHash;
use tracing::debug;

use crate::canonical::{ComponentKind, StoredComponent};
use crate::component::{Component, Slot};
use crate::error::{StoreError, StoreResult};

/// Content-addressed component store.
///
/// Backends provide four primitives keyed by [`ComponentHash`]; the
/// component-level operations ([`store`](Self::store),
/// [`retrieve`](Self::retrieve), [`retrieve_and_load`](Self::retrieve_and_load))
/// are built on top of them once, so every backend shares the same dedup,
/// ordering and decode behaviour.
///
/// Invariants:
/// - At most one stored copy per hash. An existing hash is never rewritten
///   or compared byte-for-byte.
/// - Children are durable before a parent that references them is written.
/// - All I/O errors are propagated, never silently ignored.
pub trait ComponentStore: Send + Sync {
    /// Read the stored form under `hash`.
    ///
    /// Returns `Ok(None)` if nothing is stored there.
    fn read(&self, hash: &ComponentHash) -> StoreResult<Option<StoredComponent>>;

    /// Persist `stored` under `hash` unless an entry already exists.
    ///
    /// Returns `true` if a write happened, `false` on a dedup hit.
    fn write(&self, hash: &ComponentHash, stored: &StoredComponent) -> StoreResult<bool>;

    /// Check whether an entry exists under `hash`.
    fn exists(&self, hash: &ComponentHash) -> StoreResult<bool>;

    /// Delete the entry under `hash`. Returns `true` if it existed.
    ///
    /// Intended for maintenance and tests only: deleting a referenced
    /// component leaves dangling parents and index entries.
    fn delete(&self, hash: &ComponentHash) -> StoreResult<bool>;

    /// Store a component and, depth-first, every live child it references.
    ///
    /// If the component's hash is already present this is a no-op: the
    /// existing entry implies its children were written before it.
    fn store(&self, component: &Component) -> StoreResult<ComponentHash> {
        let hash = component.content_hash();
        if self.exists(&hash)? {
            debug!(hash = %hash.short_hex(), kind = %component.kind(), "dedup hit");
            return Ok(hash);
        }

        if let Some(composite) = component.as_composite() {
            for slot in composite.children() {
                match slot {
                    Slot::Ready(child) if child.kind() == ComponentKind::Analytic => {}
                    Slot::Ready(child) => {
                        self.store(child)?;
                    }
                    Slot::Pending(child) => {
                        if !self.exists(child.hash())? {
                            return Err(StoreError::NotFound(*child.hash()));
                        }
                    }
                }
            }
        }

        let stored = component.to_stored()?;
        self.write(&hash, &stored)?;
        debug!(hash = %hash.short_hex(), kind = %component.kind(), "component stored");
        Ok(hash)
    }

    /// Reconstruct the component under `hash` without loading its children.
    fn retrieve(&self, hash: &ComponentHash) -> StoreResult<Component> {
        let stored = self.read(hash)?.ok_or(StoreError::NotFound(*hash))?;
        let component = Component::from_stored(&stored)?;
        let computed = component.content_hash();
        if computed != *hash {
            return Err(StoreError::HashMismatch {
                hash: *hash,
                computed,
            });
        }
        Ok(component)
    }

    /// [`retrieve`](Self::retrieve) followed by a recursive load.
    fn retrieve_and_load(&self, hash: &ComponentHash) -> StoreResult<Component> {
        let mut component = self.retrieve(hash)?;
        component.load(self)?;
        Ok(component)
    }
}
