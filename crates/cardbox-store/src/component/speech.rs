use std::ops::{Deref, DerefMut};

use crate::canonical::{CanonicalForm, ComponentKind};
use crate::error::StoreResult;
use crate::traits::ComponentStore;

use super::composite::{Composite, Slot};

/// Top-level ordered deliverable.
///
/// Stored exactly like a [`Block`](super::Block) under its own hash domain.
/// Edits keep the same in-memory handle and name; the content hash is
/// recomputed from the edited children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Speech(Composite);

impl Speech {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Composite::new(ComponentKind::Speech, name))
    }

    /// Builder-style [`Composite::push`].
    pub fn with(mut self, child: impl Into<Slot>) -> Self {
        self.0.push(child);
        self
    }

    pub fn from_canonical_form(form: &CanonicalForm) -> StoreResult<Self> {
        Composite::from_canonical_form(ComponentKind::Speech, form).map(Self)
    }

    /// Re-fetch every stored child so that the speech reflects what the
    /// backend currently holds. On failure the speech is left unchanged.
    pub fn reload<S: ComponentStore + ?Sized>(&mut self, store: &S) -> StoreResult<()> {
        self.0.reload(store)
    }
}

impl Deref for Speech {
    type Target = Composite;

    fn deref(&self) -> &Composite {
        &self.0
    }
}

impl DerefMut for Speech {
    fn deref_mut(&mut self) -> &mut Composite {
        &mut self.0
    }
}
