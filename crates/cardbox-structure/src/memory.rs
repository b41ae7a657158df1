//! In-memory structure index for testing and ephemeral use.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use cardbox_types::ComponentHash;

use crate::error::{StructureError, StructureResult};
use crate::names::{validate_node_name, validate_path, validate_sibling};
use crate::node::StructureNode;
use crate::path::StructurePath;
use crate::traits::StructureIndex;

/// An in-memory implementation of [`StructureIndex`].
///
/// Nodes live in a `HashMap` keyed by their full path behind a `RwLock`.
/// Data is lost when the index is dropped.
#[derive(Debug)]
pub struct InMemoryStructureIndex {
    nodes: RwLock<HashMap<StructurePath, StructureNode>>,
}

impl InMemoryStructureIndex {
    /// Create an index holding only the empty root node.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(StructurePath::root(), StructureNode::new());
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    fn nodes(&self) -> StructureResult<RwLockReadGuard<'_, HashMap<StructurePath, StructureNode>>> {
        self.nodes
            .read()
            .map_err(|e| StructureError::Backend(format!("lock poisoned: {e}")))
    }

    fn nodes_mut(&self) -> StructureResult<RwLockWriteGuard<'_, HashMap<StructurePath, StructureNode>>> {
        self.nodes
            .write()
            .map_err(|e| StructureError::Backend(format!("lock poisoned: {e}")))
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> StructureResult<usize> {
        Ok(self.nodes()?.len())
    }
}

impl Default for InMemoryStructureIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Reports the first prefix of `path` that has no node.
fn missing(nodes: &HashMap<StructurePath, StructureNode>, path: &StructurePath) -> StructureError {
    let first_missing = path
        .ancestors()
        .find(|prefix| !nodes.contains_key(prefix))
        .unwrap_or_else(|| path.clone());
    StructureError::PathNotFound(first_missing)
}

fn node<'a>(
    nodes: &'a HashMap<StructurePath, StructureNode>,
    path: &StructurePath,
) -> StructureResult<&'a StructureNode> {
    validate_path(path)?;
    nodes.get(path).ok_or_else(|| missing(nodes, path))
}

fn node_mut<'a>(
    nodes: &'a mut HashMap<StructurePath, StructureNode>,
    path: &StructurePath,
) -> StructureResult<&'a mut StructureNode> {
    validate_path(path)?;
    if !nodes.contains_key(path) {
        return Err(missing(nodes, path));
    }
    nodes
        .get_mut(path)
        .ok_or_else(|| StructureError::PathNotFound(path.clone()))
}

impl StructureIndex for InMemoryStructureIndex {
    fn add_child(&self, path: &StructurePath, name: &str) -> StructureResult<()> {
        validate_node_name(name)?;
        let mut nodes = self.nodes_mut()?;
        let parent = node_mut(&mut nodes, path)?;
        validate_sibling(&parent.children, name)?;
        if parent.add_child(name) {
            nodes.entry(path.child(name)).or_default();
        }
        Ok(())
    }

    fn add_content_hash(&self, path: &StructurePath, hash: &ComponentHash) -> StructureResult<()> {
        let mut nodes = self.nodes_mut()?;
        node_mut(&mut nodes, path)?.add_content(*hash);
        Ok(())
    }

    fn remove_content(&self, path: &StructurePath, hash: &ComponentHash) -> StructureResult<bool> {
        let mut nodes = self.nodes_mut()?;
        Ok(node_mut(&mut nodes, path)?.remove_content(hash))
    }

    fn children(&self, path: &StructurePath) -> StructureResult<Vec<String>> {
        let nodes = self.nodes()?;
        Ok(node(&nodes, path)?.children.clone())
    }

    fn content_hashes(&self, path: &StructurePath) -> StructureResult<Vec<ComponentHash>> {
        let nodes = self.nodes()?;
        Ok(node(&nodes, path)?.contents.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardbox_types::ContentHasher;
    use cardbox_store::{
        Analytic, Block, Card, Cite, Component, ComponentStore, InMemoryComponentStore, StoreError,
    };

    fn smith(text: &str) -> Card {
        Card::new(Cite::new("Smith", "2010", "Renowned writer of cards"), text)
    }

    fn dir() -> StructurePath {
        StructurePath::from(["test_dir"])
    }

    fn child_dir() -> StructurePath {
        StructurePath::from(["test_dir", "test_child_dir"])
    }

    // ---- Tree shape ----

    #[test]
    fn root_exists_and_is_empty() {
        let index = InMemoryStructureIndex::new();
        assert!(index.children(&StructurePath::root()).unwrap().is_empty());
        assert!(index.content_hashes(&StructurePath::root()).unwrap().is_empty());
        assert_eq!(index.node_count().unwrap(), 1);
    }

    #[test]
    fn nested_children_in_insertion_order() {
        let index = InMemoryStructureIndex::new();
        index.add_child(&StructurePath::root(), "test_dir").unwrap();
        index.add_child(&dir(), "test_child_dir").unwrap();
        index.add_child(&dir(), "another").unwrap();

        assert_eq!(index.children(&StructurePath::root()).unwrap(), vec!["test_dir"]);
        assert_eq!(index.children(&dir()).unwrap(), vec!["test_child_dir", "another"]);
        assert!(index.children(&child_dir()).unwrap().is_empty());
        assert!(index.contains_path(&child_dir()).unwrap());
    }

    #[test]
    fn duplicate_child_is_noop() {
        let index = InMemoryStructureIndex::new();
        index.add_child(&StructurePath::root(), "test_dir").unwrap();
        index.add_content_hash(&dir(), &ContentHasher::ANALYTIC.hash(b"kept")).unwrap();
        index.add_child(&StructurePath::root(), "test_dir").unwrap();

        assert_eq!(index.children(&StructurePath::root()).unwrap(), vec!["test_dir"]);
        assert_eq!(index.content_hashes(&dir()).unwrap().len(), 1);
        assert_eq!(index.node_count().unwrap(), 2);
    }

    // ---- Errors ----

    #[test]
    fn missing_prefix_is_path_not_found() {
        let index = InMemoryStructureIndex::new();
        let err = index.add_child(&child_dir(), "x").unwrap_err();
        assert!(matches!(err, StructureError::PathNotFound(p) if p == dir()));
        assert!(index.children(&dir()).unwrap_err().is_path_not_found());
        assert!(!index.contains_path(&dir()).unwrap());
    }

    #[test]
    fn invalid_names_are_rejected() {
        let index = InMemoryStructureIndex::new();
        for name in ["", "..", "a/b", "node.json"] {
            let err = index.add_child(&StructurePath::root(), name).unwrap_err();
            assert!(matches!(err, StructureError::InvalidName { .. }), "{name:?}");
        }
        let err = index.children(&StructurePath::from([".."])).unwrap_err();
        assert!(matches!(err, StructureError::InvalidName { .. }));
    }

    #[test]
    fn case_only_siblings_are_rejected() {
        let index = InMemoryStructureIndex::new();
        index.add_child(&StructurePath::root(), "Aff").unwrap();
        let err = index.add_child(&StructurePath::root(), "AFF").unwrap_err();
        assert!(matches!(err, StructureError::InvalidName { name, .. } if name == "AFF"));
        assert_eq!(index.children(&StructurePath::root()).unwrap(), vec!["Aff"]);
        assert_eq!(index.node_count().unwrap(), 2);
    }

    // ---- Contents ----

    #[test]
    fn contents_mirror_directory_scenario() {
        let store = InMemoryComponentStore::new();
        let index = InMemoryStructureIndex::new();
        let card = smith("text");
        let card2 = smith("textAAA");
        let block: Component = Block::new("Test Block")
            .with(card.clone())
            .with(Analytic::new("This is an analytic"))
            .into();
        for component in [card.clone().into(), card2.clone().into(), block.clone()] {
            store.store(&component).unwrap();
        }

        index.add_child(&StructurePath::root(), "test_dir").unwrap();
        index.add_child(&dir(), "test_child_dir").unwrap();
        index.add_content(&dir(), &card.clone().into()).unwrap();
        index.add_content(&dir(), &card2.clone().into()).unwrap();
        index.add_content(&child_dir(), &card2.clone().into()).unwrap();
        index.add_content(&child_dir(), &block).unwrap();

        let top = index.get_content(&dir(), &store).unwrap();
        assert_eq!(top, vec![Component::from(card), Component::from(card2.clone())]);

        let nested = index.get_content(&child_dir(), &store).unwrap();
        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0], Component::from(card2));
        assert_eq!(nested[1].content_hash(), block.content_hash());
        assert!(!nested[1].is_loaded());
    }

    #[test]
    fn duplicate_hash_is_noop() {
        let index = InMemoryStructureIndex::new();
        let hash = index
            .add_content(&StructurePath::root(), &Analytic::new("once").into())
            .unwrap();
        index.add_content_hash(&StructurePath::root(), &hash).unwrap();
        assert_eq!(index.content_hashes(&StructurePath::root()).unwrap(), vec![hash]);
    }

    #[test]
    fn add_content_does_not_store() {
        let store = InMemoryComponentStore::new();
        let index = InMemoryStructureIndex::new();
        index
            .add_content(&StructurePath::root(), &smith("unsaved").into())
            .unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn dangling_hash_surfaces_not_found() {
        let store = InMemoryComponentStore::new();
        let index = InMemoryStructureIndex::new();
        let card: Component = smith("deleted later").into();
        let hash = store.store(&card).unwrap();
        index.add_content(&StructurePath::root(), &card).unwrap();
        assert_eq!(index.get_content(&StructurePath::root(), &store).unwrap(), vec![card]);

        store.delete(&hash).unwrap();
        let err = index.get_content(&StructurePath::root(), &store).unwrap_err();
        assert!(matches!(err, StructureError::Store(StoreError::NotFound(h)) if h == hash));
    }

    #[test]
    fn remove_content_leaves_store_untouched() {
        let store = InMemoryComponentStore::new();
        let index = InMemoryStructureIndex::new();
        let card: Component = smith("moved").into();
        let hash = store.store(&card).unwrap();
        index.add_content(&StructurePath::root(), &card).unwrap();

        assert!(index.remove_content(&StructurePath::root(), &hash).unwrap());
        assert!(!index.remove_content(&StructurePath::root(), &hash).unwrap());
        assert!(index.get_content(&StructurePath::root(), &store).unwrap().is_empty());
        assert!(store.exists(&hash).unwrap());
    }
}
