//! The [`StructureIndex`] trait defining the structure tree interface.
//!
//! Any backend (in-memory, filesystem, database) implements this trait to
//! organize component hashes into a tree of named nodes. The index only
//! records identities: it never stores or deletes components.

use cardbox_store::{Component, ComponentStore};
use cardbox_types::ComponentHash;

use crate::error::{StructureError, StructureResult};
use crate::path::StructurePath;

/// Path-addressed tree of component hashes.
///
/// Implementations must be thread-safe (`Send + Sync`). The root node always
/// exists. Every operation that names a path fails with
/// [`StructureError::PathNotFound`] if a segment of it does not exist, and
/// with [`StructureError::InvalidName`] if a segment is not a valid node name.
pub trait StructureIndex: Send + Sync {
    /// Create an empty node `name` under `path`.
    ///
    /// Adding a name that already exists under `path` is a no-op.
    fn add_child(&self, path: &StructurePath, name: &str) -> StructureResult<()>;

    /// Record `hash` as contained at `path`.
    ///
    /// Adding a hash that is already contained is a no-op. The hash does not
    /// have to be present in any component store.
    fn add_content_hash(&self, path: &StructurePath, hash: &ComponentHash) -> StructureResult<()>;

    /// Drop `hash` from `path`. Returns `true` if it was contained.
    ///
    /// The component itself stays in the store.
    fn remove_content(&self, path: &StructurePath, hash: &ComponentHash) -> StructureResult<bool>;

    /// Child node names under `path`, in insertion order.
    fn children(&self, path: &StructurePath) -> StructureResult<Vec<String>>;

    /// Hashes contained at `path`, in insertion order.
    fn content_hashes(&self, path: &StructurePath) -> StructureResult<Vec<ComponentHash>>;

    /// Record `component`'s hash as contained at `path`.
    ///
    /// Does not store the component; durability is the caller's concern.
    fn add_content(&self, path: &StructurePath, component: &Component) -> StructureResult<ComponentHash> {
        let hash = component.content_hash();
        self.add_content_hash(path, &hash)?;
        Ok(hash)
    }

    /// Shallow-retrieve every component contained at `path`.
    ///
    /// A hash that `store` cannot resolve fails the whole call with
    /// [`StructureError::Store`] rather than being skipped.
    fn get_content(&self, path: &StructurePath, store: &dyn ComponentStore) -> StructureResult<Vec<Component>> {
        self.content_hashes(path)?
            .iter()
            .map(|hash| store.retrieve(hash).map_err(StructureError::from))
            .collect()
    }

    /// Check whether a node exists at `path`.
    fn contains_path(&self, path: &StructurePath) -> StructureResult<bool> {
        match self.children(path) {
            Ok(_) => Ok(true),
            Err(StructureError::PathNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
