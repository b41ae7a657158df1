//! Filesystem structure index.
//!
//! The tree is mirrored as nested directories, one per node, each holding a
//! [`NODE_FILE`] with the node's ordered child names and contained hashes:
//!
//! ```text
//! <root>/structure/
//! ├── node.json                # root node
//! └── test_dir/
//!     ├── node.json
//!     └── test_child_dir/
//!         └── node.json
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use cardbox_types::ComponentHash;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StructureError, StructureResult};
use crate::names::{validate_node_name, validate_path, validate_sibling, NODE_FILE};
use crate::node::StructureNode;
use crate::path::StructurePath;
use crate::traits::StructureIndex;

/// Directory name holding the structure tree under the backend root.
pub const STRUCTURE_DIR: &str = "structure";

/// Structure index persisted as nested directories of `node.json` files.
///
/// A new child's directory and metadata are written before the parent lists
/// it, so a parent never names a child that does not exist on disk.
#[derive(Debug, Clone)]
pub struct FileSystemStructureIndex {
    dir: PathBuf,
}

impl FileSystemStructureIndex {
    /// Open (or create) the index under `root`, creating the root node.
    pub fn open(root: &Path) -> StructureResult<Self> {
        let dir = root.join(STRUCTURE_DIR);
        fs::create_dir_all(&dir)?;
        let index = Self { dir };
        if !index.node_file(&StructurePath::root()).is_file() {
            index.write_node(&StructurePath::root(), &StructureNode::new())?;
        }
        debug!(dir = %index.dir.display(), "structure index opened");
        Ok(index)
    }

    /// Directory holding the root node.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory of the node at `path`. Segments are not validated.
    pub fn node_dir(&self, path: &StructurePath) -> PathBuf {
        path.segments()
            .iter()
            .fold(self.dir.clone(), |dir, segment| dir.join(segment))
    }

    fn node_file(&self, path: &StructurePath) -> PathBuf {
        self.node_dir(path).join(NODE_FILE)
    }

    fn read_node(&self, path: &StructurePath) -> StructureResult<StructureNode> {
        validate_path(path)?;
        let bytes = match fs::read(self.node_file(path)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StructureError::PathNotFound(self.first_missing(path)));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes)
            .map_err(|e| StructureError::Serialization(format!("malformed node {path}: {e}")))
    }

    fn write_node(&self, path: &StructurePath, node: &StructureNode) -> StructureResult<()> {
        let dir = self.node_dir(path);
        fs::create_dir_all(&dir)?;
        let data = serde_json::to_vec_pretty(node)
            .map_err(|e| StructureError::Serialization(e.to_string()))?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(dir.join(NODE_FILE))
            .map_err(|e| StructureError::Io(e.error))?;
        Ok(())
    }

    fn first_missing(&self, path: &StructurePath) -> StructurePath {
        path.ancestors()
            .find(|prefix| !self.node_file(prefix).is_file())
            .unwrap_or_else(|| path.clone())
    }

    fn update<T>(
        &self,
        path: &StructurePath,
        edit: impl FnOnce(&mut StructureNode) -> T,
        changed: impl Fn(&T) -> bool,
    ) -> StructureResult<T> {
        let mut node = self.read_node(path)?;
        let result = edit(&mut node);
        if changed(&result) {
            self.write_node(path, &node)?;
        }
        Ok(result)
    }
}

impl StructureIndex for FileSystemStructureIndex {
    fn add_child(&self, path: &StructurePath, name: &str) -> StructureResult<()> {
        validate_node_name(name)?;
        let mut parent = self.read_node(path)?;
        if parent.has_child(name) {
            return Ok(());
        }
        validate_sibling(&parent.children, name)?;
        let child = path.child(name);
        if !self.node_file(&child).is_file() {
            self.write_node(&child, &StructureNode::new())?;
        }
        parent.add_child(name);
        self.write_node(path, &parent)?;
        debug!(path = %child, "structure node created");
        Ok(())
    }

    fn add_content_hash(&self, path: &StructurePath, hash: &ComponentHash) -> StructureResult<()> {
        let added = self.update(path, |node| node.add_content(*hash), |added| *added)?;
        if added {
            debug!(path = %path, hash = %hash.short_hex(), "content indexed");
        }
        Ok(())
    }

    fn remove_content(&self, path: &StructurePath, hash: &ComponentHash) -> StructureResult<bool> {
        self.update(path, |node| node.remove_content(hash), |removed| *removed)
    }

    fn children(&self, path: &StructurePath) -> StructureResult<Vec<String>> {
        Ok(self.read_node(path)?.children)
    }

    fn content_hashes(&self, path: &StructurePath) -> StructureResult<Vec<ComponentHash>> {
        Ok(self.read_node(path)?.contents)
    }
}
