//! Port interfaces for blob storage.
//!
//! Ports define the contract between callers (and decorators) and the
//! storage backends. A backend implements both ports; a decorator wraps
//! either one and re-exposes the same contract, so callers cannot tell a
//! wrapped store from the real thing.

mod blob_store;
mod blob_writer;
pub mod errors;

pub use blob_store::BlobStorePort;
pub use blob_writer::BlobWriterPort;
pub use errors::BlobStoreError;
