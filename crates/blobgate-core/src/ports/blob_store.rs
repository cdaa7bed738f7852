use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use super::blob_writer::BlobWriterPort;
use super::errors::BlobStoreError;
use crate::domain::{CreateOptions, Descriptor, Digest, UploadId};

/// Entry point of a blob storage backend.
///
/// Completed blobs are content-addressed by [`Digest`]; in-flight uploads
/// are addressed by [`UploadId`] and manipulated through the
/// [`BlobWriterPort`] handles that `create` and `resume` hand out.
#[async_trait]
pub trait BlobStorePort: Send + Sync {
    /// Look up the descriptor of a stored blob.
    async fn stat(&self, digest: &Digest) -> Result<Descriptor, BlobStoreError>;

    /// Read the full content of a stored blob.
    async fn get(&self, digest: &Digest) -> Result<Bytes, BlobStoreError>;

    /// One-shot write: store `data` and return its descriptor.
    async fn put(&self, media_type: &str, data: &[u8]) -> Result<Descriptor, BlobStoreError>;

    /// Begin a new resumable upload.
    async fn create(
        &self,
        options: CreateOptions,
    ) -> Result<Box<dyn BlobWriterPort>, BlobStoreError>;

    /// Reopen an upload that was parked with [`BlobWriterPort::close`].
    async fn resume(&self, id: &UploadId) -> Result<Box<dyn BlobWriterPort>, BlobStoreError>;

    /// Remove a stored blob.
    async fn delete(&self, digest: &Digest) -> Result<(), BlobStoreError>;
}

#[async_trait]
impl<T: BlobStorePort + ?Sized> BlobStorePort for Arc<T> {
    async fn stat(&self, digest: &Digest) -> Result<Descriptor, BlobStoreError> {
        (**self).stat(digest).await
    }

    async fn get(&self, digest: &Digest) -> Result<Bytes, BlobStoreError> {
        (**self).get(digest).await
    }

    async fn put(&self, media_type: &str, data: &[u8]) -> Result<Descriptor, BlobStoreError> {
        (**self).put(media_type, data).await
    }

    async fn create(
        &self,
        options: CreateOptions,
    ) -> Result<Box<dyn BlobWriterPort>, BlobStoreError> {
        (**self).create(options).await
    }

    async fn resume(&self, id: &UploadId) -> Result<Box<dyn BlobWriterPort>, BlobStoreError> {
        (**self).resume(id).await
    }

    async fn delete(&self, digest: &Digest) -> Result<(), BlobStoreError> {
        (**self).delete(digest).await
    }
}
