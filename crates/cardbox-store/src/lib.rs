//! Content-addressed component store for Cardbox.
//!
//! Every storable artifact -- analytic, card, block, speech -- is persisted
//! once per distinct content, keyed by its [`ComponentHash`]. Composites
//! store the hashes of their children, never the children themselves, and
//! are reconstructed lazily: a shallow [`ComponentStore::retrieve`] yields
//! pending child slots that [`Component::load`] materializes on demand.
//!
//! # Component Types
//!
//! - [`Analytic`] -- plain text leaf, stored inline in its parent
//! - [`Card`] -- citation, text, tags and emphasis overlays
//! - [`Block`] -- ordered grouping of components
//! - [`Speech`] -- top-level ordered deliverable
//!
//! # Storage Backends
//!
//! All backends implement the [`ComponentStore`] trait:
//!
//! - [`InMemoryComponentStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileSystemComponentStore`] -- one JSON object per hash under a root directory
//! - [`CachedComponentStore`] -- bounded LRU read-through cache in front of any other store
//!
//! # Design Rules
//!
//! 1. A hash is computed from semantic content only, never from object identity.
//! 2. At most one stored copy per hash; an existing entry is never rewritten.
//! 3. Children are written before the parent that references them.
//! 4. Loading is all-or-nothing and idempotent.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod cache;
pub mod canonical;
pub mod component;
pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use cache::{CacheStats, CachedComponentStore, DEFAULT_CACHE_CAPACITY};
pub use canonical::{CanonicalForm, ComponentKind, ComponentRecord, StoredComponent};
pub use cardbox_types::ComponentHash;
pub use component::{
    Analytic, Block, Card, ChildRef, Cite, Component, Composite, Overlay, OverlayKind, Slot, Span,
    Speech,
};
pub use error::{StoreError, StoreResult};
pub use fs::FileSystemComponentStore;
pub use memory::InMemoryComponentStore;
pub use traits::ComponentStore;
