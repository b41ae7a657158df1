//! Canonical label/value encoding shared by every backend.
//!
//! A component is persisted as a [`StoredComponent`]: its kind plus a
//! [`CanonicalForm`]. `values[0]` carries the component's own fields and
//! `values[i + 1]` pairs with `labels[i]`, one entry per child in order.

use serde::{Deserialize, Serialize};

use cardbox_types::ContentHasher;

use crate::error::{StoreError, StoreResult};

/// The four component variants, identified on disk by their tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// Plain text leaf.
    Analytic,
    /// Citation-bearing text with overlays.
    Card,
    /// Ordered grouping of components.
    Block,
    /// Top-level ordered deliverable.
    Speech,
}

impl ComponentKind {
    /// All kinds, in tag order.
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Analytic,
        ComponentKind::Card,
        ComponentKind::Block,
        ComponentKind::Speech,
    ];

    /// The type tag written into canonical forms.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Analytic => "analytic",
            Self::Card => "card",
            Self::Block => "block",
            Self::Speech => "speech",
        }
    }

    /// Resolve a type tag. Unknown tags are a decode error.
    pub fn from_tag(tag: &str) -> StoreResult<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| StoreError::decode(format!("unrecognized component tag: {tag:?}")))
    }

    /// The domain-separated hasher for this kind.
    pub fn hasher(&self) -> &'static ContentHasher {
        match self {
            Self::Analytic => &ContentHasher::ANALYTIC,
            Self::Card => &ContentHasher::CARD,
            Self::Block => &ContentHasher::BLOCK,
            Self::Speech => &ContentHasher::SPEECH,
        }
    }

    /// Composites reference their children by hash.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Block | Self::Speech)
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Label list paired with a value list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalForm {
    /// Type tags, one per child.
    pub labels: Vec<String>,
    /// Own fields at index 0, then one serialized child per label.
    pub values: Vec<String>,
}

impl CanonicalForm {
    /// A childless form holding only the component's own field.
    pub fn leaf(value: impl Into<String>) -> Self {
        Self {
            labels: Vec::new(),
            values: vec![value.into()],
        }
    }

    /// Append a child entry.
    pub fn push_child(&mut self, tag: &str, value: impl Into<String>) {
        self.labels.push(tag.to_string());
        self.values.push(value.into());
    }

    /// Check the `values.len() == labels.len() + 1` shape.
    pub fn validate(&self) -> StoreResult<()> {
        if self.values.len() != self.labels.len() + 1 {
            return Err(StoreError::decode(format!(
                "malformed canonical form: {} labels but {} values",
                self.labels.len(),
                self.values.len()
            )));
        }
        Ok(())
    }

    /// The component's own field (`values[0]`).
    pub fn own_value(&self) -> StoreResult<&str> {
        self.validate()?;
        Ok(&self.values[0])
    }

    /// Iterate `(tag, value)` child pairs in order.
    pub fn children(&self) -> StoreResult<impl Iterator<Item = (&str, &str)>> {
        self.validate()?;
        Ok(self
            .labels
            .iter()
            .zip(self.values.iter().skip(1))
            .map(|(label, value)| (label.as_str(), value.as_str())))
    }

    /// Returns `true` if the form carries no child entries.
    pub fn is_leaf(&self) -> bool {
        self.labels.is_empty()
    }
}

/// The unit persisted under one content hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredComponent {
    pub kind: ComponentKind,
    pub form: CanonicalForm,
}

impl StoredComponent {
    pub fn new(kind: ComponentKind, form: CanonicalForm) -> Self {
        Self { kind, form }
    }

    /// Rebuild from an on-disk tag, rejecting unknown tags.
    pub fn from_tagged(tag: &str, form: CanonicalForm) -> StoreResult<Self> {
        let kind = ComponentKind::from_tag(tag)?;
        form.validate()?;
        Ok(Self { kind, form })
    }
}

/// Flat, serde-friendly record of a [`StoredComponent`].
///
/// The kind travels as a plain string so that an unknown tag surfaces as
/// [`StoreError::Decode`] rather than a generic deserialization failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub kind: String,
    pub labels: Vec<String>,
    pub values: Vec<String>,
}

impl From<&StoredComponent> for ComponentRecord {
    fn from(stored: &StoredComponent) -> Self {
        Self {
            kind: stored.kind.tag().to_string(),
            labels: stored.form.labels.clone(),
            values: stored.form.values.clone(),
        }
    }
}

impl TryFrom<ComponentRecord> for StoredComponent {
    type Error = StoreError;

    fn try_from(record: ComponentRecord) -> StoreResult<Self> {
        StoredComponent::from_tagged(
            &record.kind,
            CanonicalForm {
                labels: record.labels,
                values: record.values,
            },
        )
    }
}
