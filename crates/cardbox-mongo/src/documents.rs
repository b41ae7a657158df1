//! Document shapes of the two collections and their conversions.
//!
//! ```text
//! components: { _id: <hex hash>, kind, labels: [..], values: [..] }
//! structure:  { _id: "a/b", path: ["a", "b"], parent: "a" | null,
//!               children: [..], contents: [<hex hash>..] }
//! ```
//!
//! The root node has `_id: ""`, `path: []` and `parent: null`.

use cardbox_store::{ComponentRecord, StoreResult, StoredComponent};
use cardbox_structure::{StructureError, StructureNode, StructurePath, StructureResult};
use cardbox_types::ComponentHash;
use mongodb::bson::{doc, Bson, Document};
use serde::{Deserialize, Serialize};

/// Collection holding one document per stored hash.
pub const COMPONENTS_COLLECTION: &str = "components";

/// Collection holding one document per structure node.
pub const STRUCTURE_COLLECTION: &str = "structure";

/// A stored component as kept in the components collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub kind: String,
    pub labels: Vec<String>,
    pub values: Vec<String>,
}

impl ComponentDocument {
    pub fn new(hash: &ComponentHash, stored: &StoredComponent) -> Self {
        let record = ComponentRecord::from(stored);
        Self {
            id: hash.to_hex(),
            kind: record.kind,
            labels: record.labels,
            values: record.values,
        }
    }

    /// Fields written on first insert. `_id` comes from the filter.
    pub fn insert_fields(&self) -> Document {
        doc! {
            "kind": self.kind.clone(),
            "labels": self.labels.clone(),
            "values": self.values.clone(),
        }
    }

    pub fn into_stored(self) -> StoreResult<StoredComponent> {
        StoredComponent::try_from(ComponentRecord {
            kind: self.kind,
            labels: self.labels,
            values: self.values,
        })
    }
}

/// A structure node as kept in the structure collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub contents: Vec<String>,
}

impl NodeDocument {
    /// An empty node at `path`.
    pub fn empty(path: &StructurePath) -> Self {
        Self {
            id: path.key(),
            path: path.segments().to_vec(),
            parent: path.parent().map(|p| p.key()),
            children: Vec::new(),
            contents: Vec::new(),
        }
    }

    /// Fields written when the node is first created. `_id` comes from the filter.
    pub fn insert_fields(&self) -> Document {
        doc! {
            "path": self.path.clone(),
            "parent": self.parent.clone().map_or(Bson::Null, Bson::String),
            "children": self.children.clone(),
            "contents": self.contents.clone(),
        }
    }

    pub fn into_node(self) -> StructureResult<StructureNode> {
        let contents = self
            .contents
            .iter()
            .map(|key| {
                ComponentHash::from_hex(key).map_err(|e| {
                    StructureError::Serialization(format!("node {:?}: bad content hash {key:?}: {e}", self.id))
                })
            })
            .collect::<StructureResult<Vec<_>>>()?;
        Ok(StructureNode {
            children: self.children,
            contents,
        })
    }
}

/// Filter selecting a document by `_id`.
pub fn by_id(id: impl Into<String>) -> Document {
    doc! { "_id": id.into() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardbox_types::ContentHasher;
    use cardbox_store::{Analytic, Block, Card, Cite, Component, StoreError};
    use mongodb::bson;

    // ---- Components ----

    #[test]
    fn component_document_roundtrip() {
        let block: Component = Block::new("Test Block")
            .with(Card::new(Cite::new("Smith", "2010", "Renowned writer of cards"), "text"))
            .with(Analytic::new("This is an analytic"))
            .into();
        let hash = block.content_hash();
        let stored = block.to_stored().unwrap();

        let document = ComponentDocument::new(&hash, &stored);
        assert_eq!(document.id, hash.to_hex());
        assert_eq!(document.kind, "block");

        let bson = bson::to_document(&document).unwrap();
        assert_eq!(bson.get_str("_id").unwrap(), hash.to_hex());
        let back: ComponentDocument = bson::from_document(bson).unwrap();
        assert_eq!(back.into_stored().unwrap(), stored);
    }

    #[test]
    fn insert_fields_omit_id() {
        let stored = Component::from(Analytic::new("x")).to_stored().unwrap();
        let document = ComponentDocument::new(&ContentHasher::ANALYTIC.hash(b"x"), &stored);
        let fields = document.insert_fields();
        assert!(!fields.contains_key("_id"));
        assert_eq!(fields.get_str("kind").unwrap(), "analytic");
    }

    #[test]
    fn unknown_kind_is_decode_error() {
        let document = ComponentDocument {
            id: ContentHasher::ANALYTIC.hash(b"x").to_hex(),
            kind: "memo".into(),
            labels: vec![],
            values: vec!["x".into()],
        };
        assert!(matches!(document.into_stored(), Err(StoreError::Decode(_))));
    }

    // ---- Structure nodes ----

    #[test]
    fn root_node_document() {
        let root = NodeDocument::empty(&StructurePath::root());
        assert_eq!(root.id, "");
        assert!(root.path.is_empty());
        assert_eq!(root.parent, None);
        assert_eq!(root.insert_fields().get("parent"), Some(&Bson::Null));
    }

    #[test]
    fn nested_node_links_parent() {
        let node = NodeDocument::empty(&StructurePath::from(["test_dir", "test_child_dir"]));
        assert_eq!(node.id, "test_dir/test_child_dir");
        assert_eq!(node.parent.as_deref(), Some("test_dir"));
        assert_eq!(node.insert_fields().get_str("parent").unwrap(), "test_dir");

        let top = NodeDocument::empty(&StructurePath::from(["test_dir"]));
        assert_eq!(top.parent.as_deref(), Some(""));
    }

    #[test]
    fn node_contents_parse_as_hashes() {
        let hash = ContentHasher::ANALYTIC.hash(b"card");
        let mut document = NodeDocument::empty(&StructurePath::root());
        document.children.push("test_dir".into());
        document.contents.push(hash.to_hex());

        let node = document.into_node().unwrap();
        assert_eq!(node.children, vec!["test_dir"]);
        assert_eq!(node.contents, vec![hash]);
    }

    #[test]
    fn bad_content_hash_is_serialization_error() {
        let mut document = NodeDocument::empty(&StructurePath::root());
        document.contents.push("not-hex".into());
        assert!(matches!(
            document.into_node(),
            Err(StructureError::Serialization(_))
        ));
    }

    #[test]
    fn missing_node_fields_default() {
        let node: NodeDocument = bson::from_document(doc! { "_id": "a" }).unwrap();
        assert!(node.children.is_empty());
        assert!(node.into_node().unwrap().contents.is_empty());
    }
}
