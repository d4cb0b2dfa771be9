//! Error types for the ledger store.

use thiserror::Error;

use crate::kv::KvError;

/// Errors surfaced by store operations.
///
/// Read misses are ordinary [`StoreError::NotFound`] results. Write
/// failures during commit leave previously committed state intact.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record was never committed.
    #[error("record not found")]
    NotFound,

    /// Underlying key-value store failure.
    #[error("database error: {0}")]
    Database(String),

    /// Encoding or decoding of a persisted record failed.
    #[error("codec error: {0}")]
    Codec(String),

    /// A transaction index entry points outside its block payload.
    ///
    /// This is a data-integrity failure, not a routine miss.
    #[error("transaction slice [{start}, {end}) out of range for block of {size} bytes")]
    OffsetOutOfRange { start: usize, end: usize, size: usize },

    /// A stored record failed structural validation.
    #[error("corrupted record: {0}")]
    Corrupted(String),
}

impl From<KvError> for StoreError {
    fn from(err: KvError) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<bincode::Error> for StoreError {
    fn from(err: bincode::Error) -> Self {
        StoreError::Codec(err.to_string())
    }
}
