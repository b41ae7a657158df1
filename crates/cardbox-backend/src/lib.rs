//! Backend handle for Cardbox.
//!
//! A [`Backend`] is configured once from a [`BackendConfig`] and then exposes
//! the component store and the structure index of the selected backend --
//! in-memory, local filesystem, or document database -- with identical
//! semantics. The handle replaces process-wide state: callers pass it to
//! whatever needs storage, and closing or dropping it releases the backend.
//!
//! ```no_run
//! use cardbox_backend::{Backend, BackendConfig};
//! use cardbox_store::{Analytic, Block};
//! use cardbox_structure::StructurePath;
//!
//! let config = BackendConfig::load("cardbox.toml".as_ref())?;
//! let backend = Backend::open(&config)?;
//! let block = Block::new("Framework").with(Analytic::new("Util good"));
//! backend.store(&block.clone().into())?;
//! backend.add_content(&StructurePath::root(), &block.into())?;
//! # Ok::<(), cardbox_backend::BackendError>(())
//! ```

pub mod backend;
pub mod config;
pub mod error;

pub use backend::Backend;
pub use config::BackendConfig;
pub use error::{BackendError, BackendResult};
