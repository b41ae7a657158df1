//! Paths into the structure tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordered sequence of node names from the implicit root.
///
/// The empty path is the root. Paths are plain values: constructing one does
/// not validate its segments, the index does that when it walks the tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructurePath(Vec<String>);

impl StructurePath {
    /// The root path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from its segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parse a `/`-joined key as produced by [`StructurePath::key`].
    ///
    /// Empty segments are skipped, so `""`, `"/"` and `"a//b"` are accepted.
    pub fn from_key(key: &str) -> Self {
        Self::new(key.split('/').filter(|s| !s.is_empty()))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments. The root has depth zero.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The last segment, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// The path with `name` appended.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }

    /// The enclosing path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    /// The first `depth` segments of this path.
    pub fn prefix(&self, depth: usize) -> Self {
        Self(self.0[..depth.min(self.0.len())].to_vec())
    }

    /// Every proper and improper prefix, root first and `self` last.
    pub fn ancestors(&self) -> impl Iterator<Item = StructurePath> + '_ {
        (0..=self.0.len()).map(|depth| self.prefix(depth))
    }

    /// `/`-joined segments without a leading slash. The root key is `""`.
    pub fn key(&self) -> String {
        self.0.join("/")
    }
}

impl fmt::Display for StructurePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.key())
    }
}

impl From<Vec<String>> for StructurePath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl From<&[&str]> for StructurePath {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for StructurePath {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}
