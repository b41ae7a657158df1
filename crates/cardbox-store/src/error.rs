use cardbox_types::ComponentHash;

/// Errors from component store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No component is stored under the requested hash.
    #[error("component not found: {0}")]
    NotFound(ComponentHash),

    /// The decoded component does not hash to the address it was read from.
    #[error("hash mismatch for {hash}: content hashes to {computed}")]
    HashMismatch {
        hash: ComponentHash,
        computed: ComponentHash,
    },

    /// The canonical form is malformed: unknown tag, bad field count, or an
    /// undecodable field.
    #[error("decode error: {0}")]
    Decode(String),

    /// Serialization failure while encoding a component.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from a filesystem backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transient fault reported by a networked backend.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Shorthand for a [`StoreError::Decode`] with a formatted reason.
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode(reason.into())
    }

    /// Returns `true` if this error means the hash is simply absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
