//! Structure index for Cardbox.
//!
//! The structure index organizes component hashes into a tree of named
//! nodes, independent of where the component store keeps its objects. A node
//! holds an ordered set of child names and an insertion-ordered set of
//! contained hashes; it never owns the components themselves.
//!
//! # Modules
//!
//! - [`path`] -- [`StructurePath`], an ordered list of names from the root
//! - [`names`] -- node name validation
//! - [`node`] -- [`StructureNode`] metadata shared by every backend
//! - [`traits`] -- the [`StructureIndex`] trait
//! - [`memory`] -- [`InMemoryStructureIndex`] for tests and embedding
//! - [`fs`] -- [`FileSystemStructureIndex`], one directory per node

pub mod error;
pub mod fs;
pub mod memory;
pub mod names;
pub mod node;
pub mod path;
pub mod traits;

pub use error::{StructureError, StructureResult};
pub use fs::FileSystemStructureIndex;
pub use memory::InMemoryStructureIndex;
pub use names::{validate_node_name, validate_path, validate_sibling, NODE_FILE};
pub use node::StructureNode;
pub use path::StructurePath;
pub use traits::StructureIndex;
