//! Store and repository error types.

use thiserror::Error;

/// Errors produced by the document store and the repositories over it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the document file failed. The in-memory
    /// mutation is retained; callers that require strict durability
    /// must treat this as fatal.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An entity referenced by id does not exist. Deletes never produce
    /// this; they are idempotent.
    #[error("not found: {0}")]
    NotFound(String),

    /// A referential constraint was violated, e.g. activating an
    /// environment that does not belong to the collection.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
