use cardbox_store::StoreError;
use cardbox_structure::StructureError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend initialization failed: {0}")]
    Initialization(String),

    #[error("backend already initialized; close it first")]
    AlreadyInitialized,

    #[error("backend not initialized")]
    NotInitialized,

    #[error("invalid backend configuration: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("structure error: {0}")]
    Structure(#[from] StructureError),
}

impl BackendError {
    /// Returns `true` if the error reports a missing hash or structure path.
    pub fn is_not_found(&self) -> bool {
        match self {
            BackendError::Store(e) => e.is_not_found(),
            BackendError::Structure(StructureError::Store(e)) => e.is_not_found(),
            BackendError::Structure(e) => e.is_path_not_found(),
            _ => false,
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;
