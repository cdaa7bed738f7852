use thiserror::Error;

use crate::domain::{Digest, UploadId};

/// Error taxonomy shared by every blob store port implementation.
///
/// Decorators pass delegate errors through unchanged; the only kind a
/// limiting decorator originates itself is [`ResourcesExhausted`], raised
/// when the configured write budget is saturated. Callers should treat it
/// as transient and retryable.
///
/// [`ResourcesExhausted`]: BlobStoreError::ResourcesExhausted
#[derive(Debug, Error)]
pub enum BlobStoreError {
    #[error("too many concurrent blob writes")]
    ResourcesExhausted,

    #[error("unknown blob: {0}")]
    BlobUnknown(Digest),

    #[error("unknown upload: {0}")]
    UploadUnknown(UploadId),

    #[error("invalid upload: {0}")]
    UploadInvalid(String),

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: Digest, actual: Digest },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}
