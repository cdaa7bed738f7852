//! Filesystem-based blob storage.
//!
//! Layout under the configured root:
//!
//! ```text
//! blobs/sha256/<hex>/data             blob payload
//! blobs/sha256/<hex>/descriptor.json  descriptor sidecar
//! uploads/<id>/data                   upload payload, appended chunk by chunk
//! uploads/<id>/upload.json            upload manifest
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;

use blobgate_core::{
    BlobStoreError, BlobStorePort, BlobWriterPort, CreateOptions, Descriptor, Digest,
    DigestAlgorithm, UploadId,
};

#[derive(Debug, Serialize, Deserialize)]
struct UploadManifest {
    started_at: DateTime<Utc>,
    media_type: Option<String>,
}

/// Filesystem-based blob storage with resumable uploads.
pub struct FilesystemBlobStore {
    root: PathBuf,
}

impl FilesystemBlobStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn blob_dir(&self, digest: &Digest) -> PathBuf {
        self.root
            .join("blobs")
            .join(digest.alg.as_str())
            .join(hex::encode(digest.bytes))
    }

    fn upload_dir(&self, id: &UploadId) -> PathBuf {
        self.root.join("uploads").join(id.as_str())
    }

    async fn read_manifest(&self, id: &UploadId) -> Result<UploadManifest, BlobStoreError> {
        let path = self.upload_dir(id).join("upload.json");
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(BlobStoreError::UploadUnknown(id.clone()))
            }
            Err(err) => return Err(err.into()),
        };
        let manifest = serde_json::from_slice(&raw)
            .map_err(|err| BlobStoreError::Backend(anyhow::Error::from(err)))?;
        Ok(manifest)
    }

    async fn write_descriptor(
        &self,
        dir: &Path,
        descriptor: &Descriptor,
    ) -> Result<(), BlobStoreError> {
        let raw = serde_json::to_vec_pretty(descriptor)
            .map_err(|err| BlobStoreError::Backend(anyhow::Error::from(err)))?;
        tokio::fs::write(dir.join("descriptor.json"), raw).await?;
        Ok(())
    }
}

#[async_trait]
impl BlobStorePort for FilesystemBlobStore {
    async fn stat(&self, digest: &Digest) -> Result<Descriptor, BlobStoreError> {
        let path = self.blob_dir(digest).join("descriptor.json");
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(BlobStoreError::BlobUnknown(*digest))
            }
            Err(err) => return Err(err.into()),
        };
        let descriptor = serde_json::from_slice(&raw)
            .map_err(|err| BlobStoreError::Backend(anyhow::Error::from(err)))?;
        Ok(descriptor)
    }

    async fn get(&self, digest: &Digest) -> Result<Bytes, BlobStoreError> {
        let path = self.blob_dir(digest).join("data");
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(BlobStoreError::BlobUnknown(*digest))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn put(&self, media_type: &str, data: &[u8]) -> Result<Descriptor, BlobStoreError> {
        let digest = Digest::from_bytes(data);
        let descriptor = Descriptor::new(media_type, data.len() as u64, digest);

        let dir = self.blob_dir(&digest);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join("data"), data).await?;
        self.write_descriptor(&dir, &descriptor).await?;
        Ok(descriptor)
    }

    async fn create(
        &self,
        options: CreateOptions,
    ) -> Result<Box<dyn BlobWriterPort>, BlobStoreError> {
        let id = UploadId::new();
        let started_at = Utc::now();
        let dir = self.upload_dir(&id);
        tokio::fs::create_dir_all(&dir).await?;

        let manifest = UploadManifest {
            started_at,
            media_type: options.media_type,
        };
        let raw = serde_json::to_vec_pretty(&manifest)
            .map_err(|err| BlobStoreError::Backend(anyhow::Error::from(err)))?;
        tokio::fs::write(dir.join("upload.json"), raw).await?;
        tokio::fs::File::create(dir.join("data")).await?;

        Ok(Box::new(FilesystemBlobWriter {
            id,
            started_at,
            store_root: self.root.clone(),
            dir,
            size: AtomicU64::new(0),
            terminated: AtomicBool::new(false),
        }))
    }

    async fn resume(&self, id: &UploadId) -> Result<Box<dyn BlobWriterPort>, BlobStoreError> {
        let manifest = self.read_manifest(id).await?;
        let dir = self.upload_dir(id);
        let size = match tokio::fs::metadata(dir.join("data")).await {
            Ok(meta) => meta.len(),
            Err(err) if err.kind() == ErrorKind::NotFound => 0,
            Err(err) => return Err(err.into()),
        };
        Ok(Box::new(FilesystemBlobWriter {
            id: id.clone(),
            started_at: manifest.started_at,
            store_root: self.root.clone(),
            dir,
            size: AtomicU64::new(size),
            terminated: AtomicBool::new(false),
        }))
    }

    async fn delete(&self, digest: &Digest) -> Result<(), BlobStoreError> {
        let dir = self.blob_dir(digest);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(BlobStoreError::BlobUnknown(*digest))
            }
            Err(err) => Err(err.into()),
        }
    }
}

struct FilesystemBlobWriter {
    id: UploadId,
    started_at: DateTime<Utc>,
    store_root: PathBuf,
    dir: PathBuf,
    size: AtomicU64,
    terminated: AtomicBool,
}

impl FilesystemBlobWriter {
    fn blob_dir(&self, digest: &Digest) -> PathBuf {
        self.store_root
            .join("blobs")
            .join(digest.alg.as_str())
            .join(hex::encode(digest.bytes))
    }

    async fn read_manifest(&self) -> Result<UploadManifest, BlobStoreError> {
        let raw = match tokio::fs::read(self.dir.join("upload.json")).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(BlobStoreError::UploadUnknown(self.id.clone()))
            }
            Err(err) => return Err(err.into()),
        };
        serde_json::from_slice(&raw).map_err(|err| BlobStoreError::Backend(anyhow::Error::from(err)))
    }

    /// Hash the upload payload in chunks; returns the digest and total size.
    async fn hash_payload(&self) -> Result<(Digest, u64), BlobStoreError> {
        let mut file = match tokio::fs::File::open(self.dir.join("data")).await {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(BlobStoreError::UploadUnknown(self.id.clone()))
            }
            Err(err) => return Err(err.into()),
        };
        let mut hasher = Sha256::new();
        let mut total = 0u64;
        let mut buf = vec![0u8; 8192];
        loop {
            let n = file.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            total += n as u64;
        }
        let digest = Digest {
            alg: DigestAlgorithm::Sha256,
            bytes: hasher.finalize().into(),
        };
        Ok((digest, total))
    }
}

#[async_trait]
impl BlobWriterPort for FilesystemBlobWriter {
    fn id(&self) -> UploadId {
        self.id.clone()
    }

    fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    async fn size(&self) -> u64 {
        self.size.load(Ordering::Acquire)
    }

    async fn write_chunk(&self, chunk: &[u8]) -> Result<u64, BlobStoreError> {
        if self.terminated.load(Ordering::Acquire) {
            return Err(BlobStoreError::UploadInvalid(
                "upload already terminated".to_string(),
            ));
        }
        let mut file = match tokio::fs::OpenOptions::new()
            .append(true)
            .open(self.dir.join("data"))
            .await
        {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(BlobStoreError::UploadUnknown(self.id.clone()))
            }
            Err(err) => return Err(err.into()),
        };
        file.write_all(chunk).await?;
        file.flush().await?;
        let total = self.size.fetch_add(chunk.len() as u64, Ordering::AcqRel) + chunk.len() as u64;
        Ok(total)
    }

    async fn close(&self) -> Result<(), BlobStoreError> {
        // Parks the upload on disk; `resume` picks it back up.
        self.terminated.store(true, Ordering::Release);
        Ok(())
    }

    async fn commit(&self, provisional: Descriptor) -> Result<Descriptor, BlobStoreError> {
        if self.terminated.swap(true, Ordering::AcqRel) {
            return Err(BlobStoreError::UploadInvalid(
                "upload already terminated".to_string(),
            ));
        }
        let manifest = self.read_manifest().await?;
        let (actual, total) = self.hash_payload().await?;

        if actual != provisional.digest {
            return Err(BlobStoreError::DigestMismatch {
                expected: provisional.digest,
                actual,
            });
        }
        if provisional.size != 0 && provisional.size != total {
            return Err(BlobStoreError::UploadInvalid(format!(
                "size mismatch: descriptor says {}, wrote {}",
                provisional.size, total
            )));
        }

        let media_type = if !provisional.media_type.is_empty() {
            provisional.media_type
        } else {
            manifest
                .media_type
                .unwrap_or_else(|| "application/octet-stream".to_string())
        };
        let descriptor = Descriptor::new(media_type, total, actual);

        let blob_dir = self.blob_dir(&actual);
        tokio::fs::create_dir_all(&blob_dir).await?;
        tokio::fs::rename(self.dir.join("data"), blob_dir.join("data")).await?;
        let raw = serde_json::to_vec_pretty(&descriptor)
            .map_err(|err| BlobStoreError::Backend(anyhow::Error::from(err)))?;
        tokio::fs::write(blob_dir.join("descriptor.json"), raw).await?;
        tokio::fs::remove_dir_all(&self.dir).await?;

        debug!(digest = %actual, size = total, "committed upload to blob store");
        Ok(descriptor)
    }

    async fn cancel(&self) -> Result<(), BlobStoreError> {
        if self.terminated.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
