//! Foundation types for Cardbox.
//!
//! Every other Cardbox crate depends on `cardbox-types` for the identity of
//! stored components.
//!
//! # Key Types
//!
//! - [`ComponentHash`] -- Content-addressed identity (BLAKE3 digest)
//! - [`ContentHasher`] -- Domain-separated hasher, one domain per component kind
//! - [`HashBuilder`] -- Incremental hashing over length-framed fields

pub mod error;
pub mod hash;
pub mod hasher;

pub use error::TypeError;
pub use hash::ComponentHash;
pub use hasher::{ContentHasher, HashBuilder};
