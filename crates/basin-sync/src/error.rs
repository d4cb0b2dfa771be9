//! Error types for the synchronizer.

use thiserror::Error;

/// Errors reported by message handlers.
///
/// Admission and range failures are reported to the caller *and*
/// mirrored as a wire rejection; the handler sends the response before
/// returning the error. Nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The message violated the protocol (untrusted sender, bad range,
    /// malformed payload). Callers use this for peer scoring.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// A received block could not be decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// The chain-state port failed to apply a block or certificate.
    #[error("chain state error: {0}")]
    Chain(String),
}

impl From<bincode::Error> for SyncError {
    fn from(err: bincode::Error) -> Self {
        SyncError::Codec(err.to_string())
    }
}

impl From<basin_store::StoreError> for SyncError {
    fn from(err: basin_store::StoreError) -> Self {
        SyncError::Chain(err.to_string())
    }
}
