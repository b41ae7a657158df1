//! Error types for the document-database backend.

use cardbox_store::StoreError;
use cardbox_structure::StructureError;
use thiserror::Error;

/// Errors raised while connecting to the database.
///
/// Once connected, operations report through [`StoreError::Backend`] and
/// [`StructureError::Backend`] so callers see the same error types as with
/// any other backend.
#[derive(Debug, Error)]
pub enum MongoError {
    /// The configured host and port do not form a valid server address.
    #[error("invalid server address {address}: {source}")]
    InvalidAddress {
        address: String,
        source: mongodb::error::Error,
    },

    /// The server did not answer the initial ping.
    #[error("database server {address} unreachable: {source}")]
    Unreachable {
        address: String,
        source: mongodb::error::Error,
    },

    /// The server answered but the collections could not be prepared.
    #[error("database setup failed: {0}")]
    Setup(String),

    /// Any other driver failure during setup.
    #[error("database driver error: {0}")]
    Driver(#[from] mongodb::error::Error),
}

/// Convenience type alias for connection setup.
pub type MongoResult<T> = std::result::Result<T, MongoError>;

pub(crate) fn store_error(e: mongodb::error::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

pub(crate) fn structure_error(e: mongodb::error::Error) -> StructureError {
    StructureError::Backend(e.to_string())
}
