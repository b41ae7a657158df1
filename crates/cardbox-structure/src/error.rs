//! Error types for structure index operations.

use cardbox_store::StoreError;
use thiserror::Error;

use crate::path::StructurePath;

/// Errors that can occur during structure index operations.
#[derive(Debug, Error)]
pub enum StructureError {
    /// A segment of the path does not exist. Carries the first missing prefix.
    #[error("structure path not found: {0}")]
    PathNotFound(StructurePath),

    /// The node name is not allowed.
    #[error("invalid node name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// Resolving an indexed hash against the component store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Serialization or deserialization of node metadata failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error in the filesystem index.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by a networked index backend.
    #[error("structure backend error: {0}")]
    Backend(String),
}

impl StructureError {
    /// Returns `true` for [`StructureError::PathNotFound`].
    pub fn is_path_not_found(&self) -> bool {
        matches!(self, StructureError::PathNotFound(_))
    }
}

/// Convenience type alias for structure index operations.
pub type StructureResult<T> = std::result::Result<T, StructureError>;
