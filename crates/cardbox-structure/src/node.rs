//! Per-node metadata of the structure tree.

use cardbox_types::ComponentHash;
use serde::{Deserialize, Serialize};

/// One node of the structure tree: named children and contained hashes.
///
/// Both lists behave as insertion-ordered sets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureNode {
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub contents: Vec<ComponentHash>,
}

impl StructureNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a child name. Returns `false` if it was already present.
    pub fn add_child(&mut self, name: &str) -> bool {
        if self.has_child(name) {
            return false;
        }
        self.children.push(name.to_string());
        true
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.children.iter().any(|c| c == name)
    }

    /// Append a hash. Returns `false` if it was already present.
    pub fn add_content(&mut self, hash: ComponentHash) -> bool {
        if self.contents.contains(&hash) {
            return false;
        }
        self.contents.push(hash);
        true
    }

    /// Remove a hash. Returns `false` if it was not present.
    pub fn remove_content(&mut self, hash: &ComponentHash) -> bool {
        let before = self.contents.len();
        self.contents.retain(|h| h != hash);
        self.contents.len() != before
    }

    /// Contained hashes as hex strings, in order.
    pub fn content_keys(&self) -> Vec<String> {
        self.contents.iter().map(ComponentHash::to_hex).collect()
    }
}
