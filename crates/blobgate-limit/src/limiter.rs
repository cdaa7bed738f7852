use std::sync::Arc;

use blobgate_core::BlobStorePort;

use crate::store::LimitedBlobStore;
use crate::sync::WriteSemaphore;

/// Factory holding the one shared write budget.
///
/// Every store wrapped by the same limiter draws permits from the same
/// semaphore, so the limit is global across all of them — one process-wide
/// write-concurrency budget over however many backends are in play.
#[derive(Clone)]
pub struct WriteLimiter {
    semaphore: Arc<WriteSemaphore>,
}

impl WriteLimiter {
    pub fn new(limit: usize) -> Self {
        Self {
            semaphore: Arc::new(WriteSemaphore::new(limit)),
        }
    }

    pub fn wrap_store<S: BlobStorePort>(&self, store: S) -> LimitedBlobStore<S> {
        LimitedBlobStore::new(store, self.semaphore.clone())
    }

    pub fn limit(&self) -> usize {
        self.semaphore.capacity()
    }

    /// Write slots currently free.
    pub fn available_writes(&self) -> usize {
        self.semaphore.available()
    }
}
