//! The component hierarchy.
//!
//! [`Component`] is a closed sum over the four storable variants. Every
//! variant derives its [`ComponentHash`] from semantic content only, caches
//! it, and drops the cache on mutation.

mod analytic;
mod block;
mod card;
mod composite;
mod speech;

use std::fmt;
use std::sync::OnceLock;

use cardbox_types::ComponentHash;

use crate::canonical::{CanonicalForm, ComponentKind, StoredComponent};
use crate::error::StoreResult;
use crate::traits::ComponentStore;

pub use analytic::Analytic;
pub use block::Block;
pub use card::{Card, Cite, Overlay, OverlayKind, Span};
pub use composite::{ChildRef, Composite, Slot};
pub use speech::Speech;

/// Lazily computed content hash.
#[derive(Clone, Default)]
pub(crate) struct HashCell(OnceLock<ComponentHash>);

impl HashCell {
    pub(crate) fn get_or_compute(&self, compute: impl FnOnce() -> ComponentHash) -> ComponentHash {
        *self.0.get_or_init(compute)
    }

    pub(crate) fn invalidate(&mut self) {
        self.0.take();
    }
}

impl fmt::Debug for HashCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.get() {
            Some(hash) => write!(f, "{hash:?}"),
            None => f.write_str("<uncomputed>"),
        }
    }
}

/// Any storable artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Component {
    Analytic(Analytic),
    Card(Card),
    Block(Block),
    Speech(Speech),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Analytic(_) => ComponentKind::Analytic,
            Self::Card(_) => ComponentKind::Card,
            Self::Block(_) => ComponentKind::Block,
            Self::Speech(_) => ComponentKind::Speech,
        }
    }

    /// Human-readable identifier, independent of the hash.
    pub fn label(&self) -> String {
        match self {
            Self::Analytic(a) => a.label(),
            Self::Card(c) => c.label(),
            Self::Block(b) => b.label(),
            Self::Speech(s) => s.label(),
        }
    }

    pub fn content_hash(&self) -> ComponentHash {
        match self {
            Self::Analytic(a) => a.content_hash(),
            Self::Card(c) => c.content_hash(),
            Self::Block(b) => b.content_hash(),
            Self::Speech(s) => s.content_hash(),
        }
    }

    pub fn to_canonical_form(&self) -> StoreResult<CanonicalForm> {
        match self {
            Self::Analytic(a) => Ok(a.to_canonical_form()),
            Self::Card(c) => c.to_canonical_form(),
            Self::Block(b) => Ok(b.to_canonical_form()),
            Self::Speech(s) => Ok(s.to_canonical_form()),
        }
    }

    /// Decode a form of the given kind. Composite children come back as
    /// [`Slot::Pending`] (analytics excepted) and the result is unloaded.
    pub fn from_canonical_form(kind: ComponentKind, form: &CanonicalForm) -> StoreResult<Self> {
        match kind {
            ComponentKind::Analytic => Analytic::from_canonical_form(form).map(Self::Analytic),
            ComponentKind::Card => Card::from_canonical_form(form).map(Self::Card),
            ComponentKind::Block => Block::from_canonical_form(form).map(Self::Block),
            ComponentKind::Speech => Speech::from_canonical_form(form).map(Self::Speech),
        }
    }

    pub fn to_stored(&self) -> StoreResult<StoredComponent> {
        Ok(StoredComponent::new(self.kind(), self.to_canonical_form()?))
    }

    pub fn from_stored(stored: &StoredComponent) -> StoreResult<Self> {
        Self::from_canonical_form(stored.kind, &stored.form)
    }

    /// Recursively materialize children from `store`. No-op for leaves and
    /// for already-loaded composites.
    pub fn load<S: ComponentStore + ?Sized>(&mut self, store: &S) -> StoreResult<()> {
        match self {
            Self::Analytic(_) | Self::Card(_) => Ok(()),
            Self::Block(b) => b.load(store),
            Self::Speech(s) => s.load(store),
        }
    }

    pub fn is_loaded(&self) -> bool {
        match self {
            Self::Analytic(_) | Self::Card(_) => true,
            Self::Block(b) => b.is_loaded(),
            Self::Speech(s) => s.is_loaded(),
        }
    }

    /// The shared composite body of a block or speech.
    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            Self::Block(b) => Some(&**b),
            Self::Speech(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_composite_mut(&mut self) -> Option<&mut Composite> {
        match self {
            Self::Block(b) => Some(&mut **b),
            Self::Speech(s) => Some(&mut **s),
            _ => None,
        }
    }

    pub fn as_analytic(&self) -> Option<&Analytic> {
        match self {
            Self::Analytic(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_card(&self) -> Option<&Card> {
        match self {
            Self::Card(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Self::Block(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_speech(&self) -> Option<&Speech> {
        match self {
            Self::Speech(s) => Some(s),
            _ => None,
        }
    }
}

macro_rules! component_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Component {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }

            impl From<$variant> for Slot {
                fn from(value: $variant) -> Self {
                    Slot::ready(value)
                }
            }
        )*
    };
}

component_from!(Analytic, Card, Block, Speech);
