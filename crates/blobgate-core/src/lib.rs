//! # blobgate-core
//!
//! Domain types and port contracts for blobgate.
//!
//! This crate contains the pure domain model (digests, descriptors, upload
//! ids) and the capability traits that backends and decorators implement.
//! It carries no infrastructure dependencies.

pub mod domain;
pub mod ports;

// Re-export commonly used types at the crate root
pub use domain::{CreateOptions, Descriptor, Digest, DigestAlgorithm, DigestParseError, UploadId};
pub use ports::{BlobStoreError, BlobStorePort, BlobWriterPort};
