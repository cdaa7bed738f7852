//! Backend contract tests shared by both reference stores.

use tempfile::TempDir;

use blobgate_core::{
    BlobStoreError, BlobStorePort, CreateOptions, Descriptor, Digest, UploadId,
};
use blobgate_store::{BlobStorageConfig, FilesystemBlobStore, MemoryBlobStore};

async fn assert_put_stat_get_roundtrip(store: &dyn BlobStorePort) {
    let descriptor = store.put("text/plain", b"hello, world!").await.unwrap();
    assert_eq!(descriptor.size, 13);
    assert_eq!(descriptor.media_type, "text/plain");
    assert_eq!(descriptor.digest, Digest::from_bytes(b"hello, world!"));

    let stat = store.stat(&descriptor.digest).await.unwrap();
    assert_eq!(stat, descriptor);

    let data = store.get(&descriptor.digest).await.unwrap();
    assert_eq!(data.as_ref(), b"hello, world!");
}

async fn assert_upload_lifecycle(store: &dyn BlobStorePort) {
    let writer = store
        .create(CreateOptions {
            media_type: Some("application/json".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(writer.size().await, 0);
    let total = writer.write_chunk(b"{\"a\":").await.unwrap();
    assert_eq!(total, 5);
    let total = writer.write_chunk(b"1}").await.unwrap();
    assert_eq!(total, 7);

    let digest = Digest::from_bytes(b"{\"a\":1}");
    let committed = writer.commit(Descriptor::new("", 7, digest)).await.unwrap();
    // Empty provisional media type falls back to the create-time hint.
    assert_eq!(committed.media_type, "application/json");
    assert_eq!(committed.size, 7);
    assert_eq!(committed.digest, digest);

    assert_eq!(store.get(&digest).await.unwrap().as_ref(), b"{\"a\":1}");
}

async fn assert_resume_after_close(store: &dyn BlobStorePort) {
    let writer = store.create(CreateOptions::default()).await.unwrap();
    writer.write_chunk(b"hello").await.unwrap();
    let id = writer.id();
    let started_at = writer.started_at();
    writer.close().await.unwrap();

    let resumed = store.resume(&id).await.unwrap();
    assert_eq!(resumed.id(), id);
    assert_eq!(resumed.started_at(), started_at);
    assert_eq!(resumed.size().await, 5);

    resumed.write_chunk(b" world").await.unwrap();
    let digest = Digest::from_bytes(b"hello world");
    let committed = resumed.commit(Descriptor::new("", 11, digest)).await.unwrap();
    assert_eq!(committed.media_type, "application/octet-stream");

    assert_eq!(store.get(&digest).await.unwrap().as_ref(), b"hello world");
}

async fn assert_cancel_discards_upload(store: &dyn BlobStorePort) {
    let writer = store.create(CreateOptions::default()).await.unwrap();
    writer.write_chunk(b"doomed").await.unwrap();
    let id = writer.id();
    writer.cancel().await.unwrap();

    assert!(matches!(
        store.resume(&id).await,
        Err(BlobStoreError::UploadUnknown(_))
    ));
}

async fn assert_digest_mismatch_rejected(store: &dyn BlobStorePort) {
    let writer = store.create(CreateOptions::default()).await.unwrap();
    writer.write_chunk(b"actual content").await.unwrap();
    let id = writer.id();

    let wrong = Digest::from_bytes(b"something else");
    let err = writer
        .commit(Descriptor::new("", 14, wrong))
        .await
        .unwrap_err();
    assert!(matches!(err, BlobStoreError::DigestMismatch { .. }));

    // The upload survives the failed commit and can still be finished.
    let resumed = store.resume(&id).await.unwrap();
    assert_eq!(resumed.size().await, 14);

    let digest = Digest::from_bytes(b"actual content");
    let committed = resumed
        .commit(Descriptor::new("", 14, digest))
        .await
        .unwrap();
    assert_eq!(committed.digest, digest);
    assert_eq!(store.get(&digest).await.unwrap().as_ref(), b"actual content");
}

async fn assert_terminated_handle_rejects_writes(store: &dyn BlobStorePort) {
    let writer = store.create(CreateOptions::default()).await.unwrap();
    writer.close().await.unwrap();

    assert!(matches!(
        writer.write_chunk(b"late").await,
        Err(BlobStoreError::UploadInvalid(_))
    ));
    assert!(matches!(
        writer
            .commit(Descriptor::new("", 0, Digest::from_bytes(b"")))
            .await,
        Err(BlobStoreError::UploadInvalid(_))
    ));
}

async fn assert_unknown_lookups(store: &dyn BlobStorePort) {
    let digest = Digest::from_bytes(b"never stored");
    assert!(matches!(
        store.stat(&digest).await,
        Err(BlobStoreError::BlobUnknown(d)) if d == digest
    ));
    assert!(matches!(
        store.get(&digest).await,
        Err(BlobStoreError::BlobUnknown(_))
    ));
    assert!(matches!(
        store.delete(&digest).await,
        Err(BlobStoreError::BlobUnknown(_))
    ));
    assert!(matches!(
        store.resume(&UploadId::from("no-such-upload")).await,
        Err(BlobStoreError::UploadUnknown(_))
    ));
}

async fn assert_delete_removes_blob(store: &dyn BlobStorePort) {
    let descriptor = store.put("text/plain", b"ephemeral").await.unwrap();
    store.delete(&descriptor.digest).await.unwrap();
    assert!(matches!(
        store.get(&descriptor.digest).await,
        Err(BlobStoreError::BlobUnknown(_))
    ));
}

mod memory {
    use super::*;

    #[tokio::test]
    async fn put_stat_get_roundtrip() {
        assert_put_stat_get_roundtrip(&MemoryBlobStore::new()).await;
    }

    #[tokio::test]
    async fn upload_lifecycle() {
        assert_upload_lifecycle(&MemoryBlobStore::new()).await;
    }

    #[tokio::test]
    async fn resume_after_close() {
        assert_resume_after_close(&MemoryBlobStore::new()).await;
    }

    #[tokio::test]
    async fn cancel_discards_upload() {
        assert_cancel_discards_upload(&MemoryBlobStore::new()).await;
    }

    #[tokio::test]
    async fn digest_mismatch_rejected() {
        assert_digest_mismatch_rejected(&MemoryBlobStore::new()).await;
    }

    #[tokio::test]
    async fn terminated_handle_rejects_writes() {
        assert_terminated_handle_rejects_writes(&MemoryBlobStore::new()).await;
    }

    #[tokio::test]
    async fn unknown_lookups() {
        assert_unknown_lookups(&MemoryBlobStore::new()).await;
    }

    #[tokio::test]
    async fn delete_removes_blob() {
        assert_delete_removes_blob(&MemoryBlobStore::new()).await;
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemoryBlobStore::new();
        let alias = store.clone();

        let descriptor = store.put("text/plain", b"shared").await.unwrap();
        assert_eq!(alias.get(&descriptor.digest).await.unwrap().as_ref(), b"shared");
    }
}

mod filesystem {
    use super::*;

    fn store_in(dir: &TempDir) -> FilesystemBlobStore {
        FilesystemBlobStore::new(dir.path().to_path_buf())
    }

    #[tokio::test]
    async fn put_stat_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        assert_put_stat_get_roundtrip(&store_in(&dir)).await;
    }

    #[tokio::test]
    async fn upload_lifecycle() {
        let dir = TempDir::new().unwrap();
        assert_upload_lifecycle(&store_in(&dir)).await;
    }

    #[tokio::test]
    async fn resume_after_close() {
        let dir = TempDir::new().unwrap();
        assert_resume_after_close(&store_in(&dir)).await;
    }

    #[tokio::test]
    async fn cancel_discards_upload() {
        let dir = TempDir::new().unwrap();
        assert_cancel_discards_upload(&store_in(&dir)).await;
    }

    #[tokio::test]
    async fn digest_mismatch_rejected() {
        let dir = TempDir::new().unwrap();
        assert_digest_mismatch_rejected(&store_in(&dir)).await;
    }

    #[tokio::test]
    async fn terminated_handle_rejects_writes() {
        let dir = TempDir::new().unwrap();
        assert_terminated_handle_rejects_writes(&store_in(&dir)).await;
    }

    #[tokio::test]
    async fn unknown_lookups() {
        let dir = TempDir::new().unwrap();
        assert_unknown_lookups(&store_in(&dir)).await;
    }

    #[tokio::test]
    async fn delete_removes_blob() {
        let dir = TempDir::new().unwrap();
        assert_delete_removes_blob(&store_in(&dir)).await;
    }

    #[tokio::test]
    async fn committed_blob_survives_reopening_the_store() {
        let dir = TempDir::new().unwrap();
        let descriptor = store_in(&dir).put("text/plain", b"durable").await.unwrap();

        // A fresh store over the same root sees the committed blob.
        let reopened = store_in(&dir);
        assert_eq!(reopened.stat(&descriptor.digest).await.unwrap(), descriptor);
        assert_eq!(reopened.get(&descriptor.digest).await.unwrap().as_ref(), b"durable");
    }

    #[tokio::test]
    async fn config_builds_a_store_over_root_dir() {
        let dir = TempDir::new().unwrap();
        let config = BlobStorageConfig {
            root_dir: dir.path().to_path_buf(),
        };
        let store = config.store();

        let descriptor = store.put("text/plain", b"configured").await.unwrap();
        assert_eq!(store.get(&descriptor.digest).await.unwrap().as_ref(), b"configured");
    }
}
