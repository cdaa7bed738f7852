use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use blobgate_core::{
    BlobStoreError, BlobStorePort, BlobWriterPort, CreateOptions, Descriptor, Digest, UploadId,
};

struct UploadSlot {
    buf: Vec<u8>,
    media_type_hint: Option<String>,
    started_at: DateTime<Utc>,
}

#[derive(Default)]
struct MemoryState {
    blobs: Mutex<HashMap<Digest, (Descriptor, Bytes)>>,
    uploads: Mutex<HashMap<UploadId, UploadSlot>>,
}

/// In-memory blob store with resumable uploads.
///
/// Cloning shares the underlying state, so one store can be handed to
/// several callers (or wrapped more than once) and all of them see the
/// same blobs.
#[derive(Default, Clone)]
pub struct MemoryBlobStore {
    state: Arc<MemoryState>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStorePort for MemoryBlobStore {
    async fn stat(&self, digest: &Digest) -> Result<Descriptor, BlobStoreError> {
        self.state
            .blobs
            .lock()
            .unwrap()
            .get(digest)
            .map(|(descriptor, _)| descriptor.clone())
            .ok_or(BlobStoreError::BlobUnknown(*digest))
    }

    async fn get(&self, digest: &Digest) -> Result<Bytes, BlobStoreError> {
        self.state
            .blobs
            .lock()
            .unwrap()
            .get(digest)
            .map(|(_, data)| data.clone())
            .ok_or(BlobStoreError::BlobUnknown(*digest))
    }

    async fn put(&self, media_type: &str, data: &[u8]) -> Result<Descriptor, BlobStoreError> {
        let digest = Digest::from_bytes(data);
        let descriptor = Descriptor::new(media_type, data.len() as u64, digest);
        self.state
            .blobs
            .lock()
            .unwrap()
            .insert(digest, (descriptor.clone(), Bytes::copy_from_slice(data)));
        Ok(descriptor)
    }

    async fn create(
        &self,
        options: CreateOptions,
    ) -> Result<Box<dyn BlobWriterPort>, BlobStoreError> {
        let id = UploadId::new();
        let started_at = Utc::now();
        self.state.uploads.lock().unwrap().insert(
            id.clone(),
            UploadSlot {
                buf: Vec::new(),
                media_type_hint: options.media_type,
                started_at,
            },
        );
        Ok(Box::new(MemoryBlobWriter {
            id,
            started_at,
            state: self.state.clone(),
            terminated: AtomicBool::new(false),
        }))
    }

    async fn resume(&self, id: &UploadId) -> Result<Box<dyn BlobWriterPort>, BlobStoreError> {
        let started_at = {
            let uploads = self.state.uploads.lock().unwrap();
            let slot = uploads
                .get(id)
                .ok_or_else(|| BlobStoreError::UploadUnknown(id.clone()))?;
            slot.started_at
        };
        Ok(Box::new(MemoryBlobWriter {
            id: id.clone(),
            started_at,
            state: self.state.clone(),
            terminated: AtomicBool::new(false),
        }))
    }

    async fn delete(&self, digest: &Digest) -> Result<(), BlobStoreError> {
        self.state
            .blobs
            .lock()
            .unwrap()
            .remove(digest)
            .map(|_| ())
            .ok_or(BlobStoreError::BlobUnknown(*digest))
    }
}

struct MemoryBlobWriter {
    id: UploadId,
    started_at: DateTime<Utc>,
    state: Arc<MemoryState>,
    terminated: AtomicBool,
}

#[async_trait]
impl BlobWriterPort for MemoryBlobWriter {
    fn id(&self) -> UploadId {
        self.id.clone()
    }

    fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    async fn size(&self) -> u64 {
        self.state
            .uploads
            .lock()
            .unwrap()
            .get(&self.id)
            .map_or(0, |slot| slot.buf.len() as u64)
    }

    async fn write_chunk(&self, chunk: &[u8]) -> Result<u64, BlobStoreError> {
        if self.terminated.load(Ordering::Acquire) {
            return Err(BlobStoreError::UploadInvalid(
                "upload already terminated".to_string(),
            ));
        }
        let mut uploads = self.state.uploads.lock().unwrap();
        let slot = uploads
            .get_mut(&self.id)
            .ok_or_else(|| BlobStoreError::UploadUnknown(self.id.clone()))?;
        slot.buf.extend_from_slice(chunk);
        Ok(slot.buf.len() as u64)
    }

    async fn close(&self) -> Result<(), BlobStoreError> {
        // Parks the upload; it stays in the map for `resume`.
        self.terminated.store(true, Ordering::Release);
        Ok(())
    }

    async fn commit(&self, provisional: Descriptor) -> Result<Descriptor, BlobStoreError> {
        if self.terminated.swap(true, Ordering::AcqRel) {
            return Err(BlobStoreError::UploadInvalid(
                "upload already terminated".to_string(),
            ));
        }
        let mut uploads = self.state.uploads.lock().unwrap();
        let slot = uploads
            .get(&self.id)
            .ok_or_else(|| BlobStoreError::UploadUnknown(self.id.clone()))?;

        // Verify before touching the map; a failed commit leaves the upload
        // parked so the client can resume and retry.
        let actual = Digest::from_bytes(&slot.buf);
        if actual != provisional.digest {
            return Err(BlobStoreError::DigestMismatch {
                expected: provisional.digest,
                actual,
            });
        }
        if provisional.size != 0 && provisional.size != slot.buf.len() as u64 {
            return Err(BlobStoreError::UploadInvalid(format!(
                "size mismatch: descriptor says {}, wrote {}",
                provisional.size,
                slot.buf.len()
            )));
        }

        let slot = uploads
            .remove(&self.id)
            .ok_or_else(|| BlobStoreError::UploadUnknown(self.id.clone()))?;
        drop(uploads);

        let media_type = if !provisional.media_type.is_empty() {
            provisional.media_type
        } else {
            slot.media_type_hint
                .unwrap_or_else(|| "application/octet-stream".to_string())
        };
        let descriptor = Descriptor::new(media_type, slot.buf.len() as u64, actual);
        self.state
            .blobs
            .lock()
            .unwrap()
            .insert(actual, (descriptor.clone(), Bytes::from(slot.buf)));
        Ok(descriptor)
    }

    async fn cancel(&self) -> Result<(), BlobStoreError> {
        if self.terminated.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.state.uploads.lock().unwrap().remove(&self.id);
        Ok(())
    }
}
