//! # blobgate-store
//!
//! Reference [`BlobStorePort`](blobgate_core::BlobStorePort) backends:
//! [`MemoryBlobStore`] for tests and small deployments, and
//! [`FilesystemBlobStore`] for content-addressed on-disk storage. Both
//! implement the full resumable-upload lifecycle and are meant to sit
//! behind a `blobgate-limit` decorator.

mod config;
mod filesystem;
mod memory;

pub use config::BlobStorageConfig;
pub use filesystem::FilesystemBlobStore;
pub use memory::MemoryBlobStore;
