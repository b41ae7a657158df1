use std::sync::Arc;

use cardbox_types::ComponentHash;
use tracing::debug;

use crate::canonical::{CanonicalForm, ComponentKind};
use crate::error::{StoreError, StoreResult};
use crate::traits::ComponentStore;

use super::{Analytic, Component, HashCell};

/// Hash reference to a stored child that has not been materialized.
///
/// Analytics are stored inline in their parent and never referenced by
/// hash, so a reference always names a card, block or speech.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChildRef {
    kind: ComponentKind,
    hash: ComponentHash,
}

impl ChildRef {
    pub fn new(kind: ComponentKind, hash: ComponentHash) -> StoreResult<Self> {
        if kind == ComponentKind::Analytic {
            return Err(StoreError::decode(format!(
                "analytic {} cannot be referenced by hash",
                hash.short_hex()
            )));
        }
        Ok(Self { kind, hash })
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn hash(&self) -> &ComponentHash {
        &self.hash
    }
}

/// One child position of a composite.
///
/// A child is either known only by reference (`Pending`, as produced by a
/// shallow retrieve) or held live (`Ready`). Analytics are always `Ready`.
#[derive(Clone, Debug)]
pub enum Slot {
    Pending(ChildRef),
    Ready(Arc<Component>),
}

impl Slot {
    pub fn ready(component: impl Into<Component>) -> Self {
        Self::Ready(Arc::new(component.into()))
    }

    /// A not-yet-loaded reference to the stored `kind` under `hash`.
    pub fn pending(kind: ComponentKind, hash: ComponentHash) -> StoreResult<Self> {
        ChildRef::new(kind, hash).map(Self::Pending)
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Pending(child) => child.kind,
            Self::Ready(component) => component.kind(),
        }
    }

    pub fn hash(&self) -> ComponentHash {
        match self {
            Self::Pending(child) => child.hash,
            Self::Ready(component) => component.content_hash(),
        }
    }

    /// The live component, if materialized.
    pub fn component(&self) -> Option<&Component> {
        match self {
            Self::Pending(_) => None,
            Self::Ready(component) => Some(component),
        }
    }

    /// `true` once the child and its whole subtree are materialized.
    pub fn is_loaded(&self) -> bool {
        match self {
            Self::Pending(_) => false,
            Self::Ready(component) => component.is_loaded(),
        }
    }

    /// Value written next to this child's tag in the parent's canonical form.
    fn canonical_value(&self) -> String {
        match self {
            Self::Ready(component) => match component.as_ref() {
                Component::Analytic(analytic) => analytic.text().to_string(),
                other => other.content_hash().to_hex(),
            },
            Self::Pending(child) => child.hash.to_hex(),
        }
    }

    fn decode(tag: &str, value: &str) -> StoreResult<Self> {
        let kind = ComponentKind::from_tag(tag)?;
        if kind == ComponentKind::Analytic {
            return Ok(Self::ready(Analytic::new(value)));
        }
        let hash = ComponentHash::from_hex(value)
            .map_err(|e| StoreError::decode(format!("bad child hash for {kind}: {e}")))?;
        Self::pending(kind, hash)
    }

    /// Materialize this child and its subtree. Pure: returns the new slot.
    fn resolve<S: ComponentStore + ?Sized>(&self, store: &S) -> StoreResult<Self> {
        match self {
            Self::Ready(component) if component.is_loaded() => Ok(self.clone()),
            Self::Ready(component) => {
                let mut owned = component.as_ref().clone();
                owned.load(store)?;
                Ok(Self::Ready(Arc::new(owned)))
            }
            Self::Pending(child) => Self::fetch(child.kind, &child.hash, store),
        }
    }

    fn fetch<S: ComponentStore + ?Sized>(
        kind: ComponentKind,
        hash: &ComponentHash,
        store: &S,
    ) -> StoreResult<Self> {
        let component = store.retrieve_and_load(hash)?;
        if component.kind() != kind {
            return Err(StoreError::decode(format!(
                "child {} is a {}, parent expected a {kind}",
                hash.short_hex(),
                component.kind()
            )));
        }
        Ok(Self::Ready(Arc::new(component)))
    }
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Ready(a), Self::Ready(b)) => a == b,
            _ => self.kind() == other.kind() && self.hash() == other.hash(),
        }
    }
}

impl Eq for Slot {}

impl From<Component> for Slot {
    fn from(component: Component) -> Self {
        Self::Ready(Arc::new(component))
    }
}

impl From<Arc<Component>> for Slot {
    fn from(component: Arc<Component>) -> Self {
        Self::Ready(component)
    }
}

/// Shared body of [`Block`](super::Block) and [`Speech`](super::Speech).
///
/// Children are held as a live list of [`Slot`]s. The content hash covers
/// the child count and each child's tag and canonical value; the name is a
/// label only. Every structural mutation invalidates the cached hash and
/// raises the modified flag.
#[derive(Clone, Debug)]
pub struct Composite {
    kind: ComponentKind,
    name: String,
    children: Vec<Slot>,
    loaded: bool,
    modified: bool,
    hash: HashCell,
}

impl Composite {
    pub(crate) fn new(kind: ComponentKind, name: impl Into<String>) -> Self {
        debug_assert!(kind.is_composite());
        Self {
            kind,
            name: name.into(),
            children: Vec::new(),
            loaded: false,
            modified: false,
            hash: HashCell::default(),
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.modified = true;
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children(&self) -> &[Slot] {
        &self.children
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.children.get(index)
    }

    /// The live child at `index`; `None` if out of range or still pending.
    pub fn component(&self, index: usize) -> Option<&Component> {
        self.children.get(index).and_then(Slot::component)
    }

    pub fn push(&mut self, child: impl Into<Slot>) {
        let slot = child.into();
        self.loaded &= slot.is_loaded();
        self.children.push(slot);
        self.touch();
    }

    /// Insert at `index`, clamped to the current length.
    pub fn insert(&mut self, index: usize, child: impl Into<Slot>) {
        let slot = child.into();
        self.loaded &= slot.is_loaded();
        let index = index.min(self.children.len());
        self.children.insert(index, slot);
        self.touch();
    }

    pub fn remove(&mut self, index: usize) -> Option<Slot> {
        if index >= self.children.len() {
            return None;
        }
        let removed = self.children.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.children.clear();
        self.touch();
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// `true` if the children or name changed since the last save.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    fn touch(&mut self) {
        self.modified = true;
        self.hash.invalidate();
    }

    pub fn label(&self) -> String {
        self.name.clone()
    }

    pub fn content_hash(&self) -> ComponentHash {
        self.hash.get_or_compute(|| {
            let mut builder = self.kind.hasher().builder();
            builder.count(self.children.len());
            for slot in &self.children {
                builder
                    .field(slot.kind().tag().as_bytes())
                    .field(slot.canonical_value().as_bytes());
            }
            builder.finish()
        })
    }

    pub fn to_canonical_form(&self) -> CanonicalForm {
        let mut form = CanonicalForm::leaf(self.name.clone());
        for slot in &self.children {
            form.push_child(slot.kind().tag(), slot.canonical_value());
        }
        form
    }

    pub(crate) fn from_canonical_form(kind: ComponentKind, form: &CanonicalForm) -> StoreResult<Self> {
        let mut composite = Self::new(kind, form.own_value()?);
        composite.children = form
            .children()?
            .map(|(tag, value)| Slot::decode(tag, value))
            .collect::<StoreResult<_>>()?;
        Ok(composite)
    }

    /// Recursively materialize every child.
    ///
    /// Idempotent: an already-loaded composite returns immediately without
    /// touching the store. Children are resolved into a scratch list that
    /// replaces the live one only when every child succeeded, so a failure
    /// leaves the composite exactly as it was.
    pub fn load<S: ComponentStore + ?Sized>(&mut self, store: &S) -> StoreResult<()> {
        if self.loaded {
            return Ok(());
        }
        let resolved = self
            .children
            .iter()
            .map(|slot| slot.resolve(store))
            .collect::<StoreResult<Vec<_>>>()?;
        self.children = resolved;
        self.loaded = self.children.iter().all(Slot::is_loaded);
        debug!(kind = %self.kind, children = self.children.len(), "composite loaded");
        Ok(())
    }

    /// Re-fetch every hash-referenced child from the store, ignoring the
    /// loaded flag. All-or-nothing like [`Composite::load`].
    pub(crate) fn reload<S: ComponentStore + ?Sized>(&mut self, store: &S) -> StoreResult<()> {
        let refreshed = self
            .children
            .iter()
            .map(|slot| match slot {
                Slot::Ready(child) if child.kind() == ComponentKind::Analytic => Ok(slot.clone()),
                _ => Slot::fetch(slot.kind(), &slot.hash(), store),
            })
            .collect::<StoreResult<Vec<_>>>()?;
        self.children = refreshed;
        self.loaded = self.children.iter().all(Slot::is_loaded);
        self.hash.invalidate();
        debug!(kind = %self.kind, children = self.children.len(), "composite reloaded");
        Ok(())
    }
}

impl PartialEq for Composite {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.name == other.name && self.children == other.children
    }
}

impl Eq for Composite {}
