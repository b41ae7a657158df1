use std::ops::{Deref, DerefMut};

use crate::canonical::{CanonicalForm, ComponentKind};
use crate::error::StoreResult;

use super::composite::{Composite, Slot};

/// Ordered grouping of components, e.g. a set of cards answering one
/// argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block(Composite);

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Composite::new(ComponentKind::Block, name))
    }

    /// Builder-style [`Composite::push`].
    pub fn with(mut self, child: impl Into<Slot>) -> Self {
        self.0.push(child);
        self
    }

    pub fn from_canonical_form(form: &CanonicalForm) -> StoreResult<Self> {
        Composite::from_canonical_form(ComponentKind::Block, form).map(Self)
    }
}

impl Deref for Block {
    type Target = Composite;

    fn deref(&self) -> &Composite {
        &self.0
    }
}

impl DerefMut for Block {
    fn deref_mut(&mut self) -> &mut Composite {
        &mut self.0
    }
}
