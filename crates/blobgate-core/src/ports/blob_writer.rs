//! Blob Writer Port
//!
//! Handle for one in-progress upload. Exactly one of `close`, `commit` or
//! `cancel` terminates a handle:
//!
//! - `close` ends the handle but parks the upload, which stays resumable
//!   through [`BlobStorePort::resume`](super::BlobStorePort::resume);
//! - `commit` verifies the written content against the provisional
//!   descriptor and promotes it to a blob;
//! - `cancel` discards the upload.
//!
//! After a terminal call, `write_chunk` and `commit` fail with
//! `UploadInvalid`. Methods take `&self` so a handle shared behind `Arc`
//! tolerates concurrent, even duplicate, terminal calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::errors::BlobStoreError;
use crate::domain::{Descriptor, UploadId};

#[async_trait]
pub trait BlobWriterPort: Send + Sync {
    /// Identifier of the upload this handle writes to.
    fn id(&self) -> UploadId;

    /// When the upload was started.
    fn started_at(&self) -> DateTime<Utc>;

    /// Number of bytes written so far.
    async fn size(&self) -> u64;

    /// Append a chunk; returns the total bytes written so far.
    async fn write_chunk(&self, chunk: &[u8]) -> Result<u64, BlobStoreError>;

    /// End this handle, keeping the upload resumable.
    async fn close(&self) -> Result<(), BlobStoreError>;

    /// Verify the content against `provisional` and promote it to a blob.
    async fn commit(&self, provisional: Descriptor) -> Result<Descriptor, BlobStoreError>;

    /// Discard the upload.
    async fn cancel(&self) -> Result<(), BlobStoreError>;
}

impl std::fmt::Debug for dyn BlobWriterPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobWriterPort")
            .field("id", &self.id())
            .finish_non_exhaustive()
    }
}
