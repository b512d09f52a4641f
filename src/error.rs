use std::error::Error;

/// Result alias used by storage adapters and entity services.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error taxonomy shared by the storage adapters and the entity services.
///
/// `NotFound` and `EditConflict` are expected outcomes a client can recover
/// from. Everything else is an internal failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with this identifier (or the identifier is below 1).
    #[error("record not found: {table}:{id}")]
    NotFound { table: &'static str, id: i64 },

    /// The conditional update matched no row: the stored version moved on.
    #[error("edit conflict on {table}:{id} (expected version {expected})")]
    EditConflict {
        table: &'static str,
        id: i64,
        expected: i32,
    },

    /// The call outlived its deadline and was abandoned.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// In-process store lock poisoned by a panicking writer.
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),

    /// Any other storage-layer failure.
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn Error + Send + Sync>),
}

impl StoreError {
    /// Wrap an arbitrary storage-layer error.
    pub fn storage(err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        StoreError::Storage(err.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_edit_conflict(&self) -> bool {
        matches!(self, StoreError::EditConflict { .. })
    }
}
