use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, debug_span, Instrument};

use blobgate_core::{
    BlobStoreError, BlobStorePort, BlobWriterPort, CreateOptions, Descriptor, Digest, UploadId,
};

use crate::bouncer::WriteBouncer;
use crate::sync::WriteSemaphore;
use crate::writer::LimitedBlobWriter;

/// Decorates a store so every `create`/`resume` first takes a write permit.
///
/// Saturation is an immediate `ResourcesExhausted` — the request is
/// rejected, not queued; backoff belongs to the caller. If the delegate
/// call itself fails after a permit was taken, the permit is released
/// before the error propagates, so a failed attempt never leaks a slot.
/// Everything else passes through untouched (a one-shot `put` never yields
/// a caller-held handle, so it is not gated).
pub struct LimitedBlobStore<S: BlobStorePort> {
    inner: S,
    semaphore: Arc<WriteSemaphore>,
}

impl<S: BlobStorePort> LimitedBlobStore<S> {
    pub fn new(inner: S, semaphore: Arc<WriteSemaphore>) -> Self {
        Self { inner, semaphore }
    }

    fn admit(&self) -> Result<WriteBouncer, BlobStoreError> {
        WriteBouncer::try_new(self.semaphore.clone()).map_err(|err| {
            debug!(
                limit = self.semaphore.capacity(),
                "rejecting blob write: budget saturated",
            );
            err
        })
    }
}

#[async_trait]
impl<S: BlobStorePort> BlobStorePort for LimitedBlobStore<S> {
    async fn stat(&self, digest: &Digest) -> Result<Descriptor, BlobStoreError> {
        self.inner.stat(digest).await
    }

    async fn get(&self, digest: &Digest) -> Result<Bytes, BlobStoreError> {
        self.inner.get(digest).await
    }

    async fn put(&self, media_type: &str, data: &[u8]) -> Result<Descriptor, BlobStoreError> {
        self.inner.put(media_type, data).await
    }

    async fn create(
        &self,
        options: CreateOptions,
    ) -> Result<Box<dyn BlobWriterPort>, BlobStoreError> {
        let span = debug_span!("limit.blob.create", limit = self.semaphore.capacity());
        async {
            let bouncer = self.admit()?;
            match self.inner.create(options).await {
                Ok(writer) => {
                    Ok(Box::new(LimitedBlobWriter::new(writer, bouncer)) as Box<dyn BlobWriterPort>)
                }
                Err(err) => {
                    // No writer exists to own the permit; hand it back now.
                    bouncer.release();
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn resume(&self, id: &UploadId) -> Result<Box<dyn BlobWriterPort>, BlobStoreError> {
        let span = debug_span!("limit.blob.resume", upload_id = %id);
        async {
            let bouncer = self.admit()?;
            match self.inner.resume(id).await {
                Ok(writer) => {
                    Ok(Box::new(LimitedBlobWriter::new(writer, bouncer)) as Box<dyn BlobWriterPort>)
                }
                Err(err) => {
                    bouncer.release();
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, digest: &Digest) -> Result<(), BlobStoreError> {
        self.inner.delete(digest).await
    }
}
