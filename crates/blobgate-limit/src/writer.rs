use async_trait::async_trait;
use chrono::{DateTime, Utc};

use blobgate_core::{BlobStoreError, BlobWriterPort, Descriptor, UploadId};

use crate::bouncer::WriteBouncer;

/// Decorates a write handle so every terminal operation returns the permit.
///
/// The release runs before the delegate call: the permit bounds writers in
/// flight from the caller's perspective, not backend I/O, so the slot frees
/// as soon as the terminal intent is known, whether or not the delegate
/// call itself succeeds. The bouncer's one-shot guard makes repeated or
/// concurrent terminal calls safe.
pub struct LimitedBlobWriter {
    inner: Box<dyn BlobWriterPort>,
    bouncer: WriteBouncer,
}

impl LimitedBlobWriter {
    pub fn new(inner: Box<dyn BlobWriterPort>, bouncer: WriteBouncer) -> Self {
        Self { inner, bouncer }
    }
}

#[async_trait]
impl BlobWriterPort for LimitedBlobWriter {
    fn id(&self) -> UploadId {
        self.inner.id()
    }

    fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at()
    }

    async fn size(&self) -> u64 {
        self.inner.size().await
    }

    async fn write_chunk(&self, chunk: &[u8]) -> Result<u64, BlobStoreError> {
        self.inner.write_chunk(chunk).await
    }

    async fn close(&self) -> Result<(), BlobStoreError> {
        self.bouncer.release();
        self.inner.close().await
    }

    async fn commit(&self, provisional: Descriptor) -> Result<Descriptor, BlobStoreError> {
        self.bouncer.release();
        self.inner.commit(provisional).await
    }

    async fn cancel(&self) -> Result<(), BlobStoreError> {
        self.bouncer.release();
        self.inner.cancel().await
    }
}
