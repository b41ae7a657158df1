use cardbox_structure::{
    validate_node_name, validate_path, validate_sibling, StructureError, StructureIndex,
    StructureNode, StructurePath, StructureResult,
};
use cardbox_types::ComponentHash;
use mongodb::bson::doc;
use mongodb::sync::Collection;
use tracing::debug;

use crate::documents::{by_id, NodeDocument};
use crate::error::structure_error;

/// Structure index over the `structure` collection.
///
/// One document per node, keyed by the `/`-joined path. Child names and
/// contents are maintained with `$addToSet` / `$pull`, which keep the
/// arrays duplicate-free and append in insertion order.
#[derive(Clone, Debug)]
pub struct MongoStructureIndex {
    nodes: Collection<NodeDocument>,
}

impl MongoStructureIndex {
    pub fn new(nodes: Collection<NodeDocument>) -> Self {
        Self { nodes }
    }

    pub fn collection(&self) -> &Collection<NodeDocument> {
        &self.nodes
    }

    /// Create the root node if it does not exist yet.
    pub fn ensure_root(&self) -> StructureResult<()> {
        self.ensure_node(&StructurePath::root())
    }

    fn ensure_node(&self, path: &StructurePath) -> StructureResult<()> {
        let document = NodeDocument::empty(path);
        self.nodes
            .update_one(by_id(&document.id), doc! { "$setOnInsert": document.insert_fields() })
            .upsert(true)
            .run()
            .map_err(structure_error)?;
        Ok(())
    }

    fn find(&self, path: &StructurePath) -> StructureResult<Option<NodeDocument>> {
        self.nodes
            .find_one(by_id(path.key()))
            .run()
            .map_err(structure_error)
    }

    fn node(&self, path: &StructurePath) -> StructureResult<StructureNode> {
        validate_path(path)?;
        match self.find(path)? {
            Some(document) => document.into_node(),
            None => Err(self.missing(path)?),
        }
    }

    /// Error naming the first prefix of `path` with no document.
    fn missing(&self, path: &StructurePath) -> StructureResult<StructureError> {
        for prefix in path.ancestors() {
            if self.find(&prefix)?.is_none() {
                return Ok(StructureError::PathNotFound(prefix));
            }
        }
        Ok(StructureError::PathNotFound(path.clone()))
    }
}

impl StructureIndex for MongoStructureIndex {
    fn add_child(&self, path: &StructurePath, name: &str) -> StructureResult<()> {
        validate_node_name(name)?;
        let parent = self.node(path)?;
        if parent.has_child(name) {
            return Ok(());
        }
        validate_sibling(&parent.children, name)?;
        let child = path.child(name);
        self.ensure_node(&child)?;
        self.nodes
            .update_one(by_id(path.key()), doc! { "$addToSet": { "children": name } })
            .run()
            .map_err(structure_error)?;
        debug!(path = %child, "structure node created");
        Ok(())
    }

    fn add_content_hash(&self, path: &StructurePath, hash: &ComponentHash) -> StructureResult<()> {
        validate_path(path)?;
        let result = self
            .nodes
            .update_one(by_id(path.key()), doc! { "$addToSet": { "contents": hash.to_hex() } })
            .run()
            .map_err(structure_error)?;
        if result.matched_count == 0 {
            return Err(self.missing(path)?);
        }
        if result.modified_count > 0 {
            debug!(path = %path, hash = %hash.short_hex(), "content indexed");
        }
        Ok(())
    }

    fn remove_content(&self, path: &StructurePath, hash: &ComponentHash) -> StructureResult<bool> {
        validate_path(path)?;
        let result = self
            .nodes
            .update_one(by_id(path.key()), doc! { "$pull": { "contents": hash.to_hex() } })
            .run()
            .map_err(structure_error)?;
        if result.matched_count == 0 {
            return Err(self.missing(path)?);
        }
        Ok(result.modified_count > 0)
    }

    fn children(&self, path: &StructurePath) -> StructureResult<Vec<String>> {
        Ok(self.node(path)?.children)
    }

    fn content_hashes(&self, path: &StructurePath) -> StructureResult<Vec<ComponentHash>> {
        Ok(self.node(path)?.contents)
    }
}
