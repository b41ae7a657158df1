//! Document-database backend for Cardbox.
//!
//! Components live in the `components` collection, one document per content
//! hash; the structure tree lives in the `structure` collection, one document
//! per node with parent linkage, child names and contained hashes. Both
//! implement the same traits as the filesystem backend, so callers see
//! identical semantics.
//!
//! The driver's blocking API is used throughout. Callers that need a
//! responsive thread dispatch calls to a worker themselves.

pub mod backend;
pub mod config;
pub mod documents;
pub mod error;
pub mod store;
pub mod structure;

pub use backend::{client_options, MongoBackend};
pub use config::MongoConfig;
pub use documents::{ComponentDocument, NodeDocument, COMPONENTS_COLLECTION, STRUCTURE_COLLECTION};
pub use error::{MongoError, MongoResult};
pub use store::MongoComponentStore;
pub use structure::MongoStructureIndex;
