use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use blobgate_core::BlobStoreError;

use crate::sync::WriteSemaphore;

/// Couples one semaphore permit to one writer lifecycle.
///
/// Construction takes the permit or fails with `ResourcesExhausted`;
/// [`release`] hands it back exactly once, no matter how many callers
/// invoke it or from how many tasks. Dropping an unreleased bouncer also
/// releases, so an abandoned writer cannot leak its permit.
///
/// [`release`]: WriteBouncer::release
pub struct WriteBouncer {
    sem: Arc<WriteSemaphore>,
    released: AtomicBool,
}

impl WriteBouncer {
    /// Try to take a permit from `sem`. On saturation no bouncer exists
    /// and the caller must not proceed with the write.
    pub fn try_new(sem: Arc<WriteSemaphore>) -> Result<Self, BlobStoreError> {
        if !sem.try_acquire() {
            return Err(BlobStoreError::ResourcesExhausted);
        }
        Ok(Self {
            sem,
            released: AtomicBool::new(false),
        })
    }

    /// Return the permit. Idempotent: under concurrent callers exactly one
    /// reaches the semaphore.
    pub fn release(&self) {
        if self
            .released
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.sem.release();
        }
    }
}

impl Drop for WriteBouncer {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_fails_when_saturated() {
        let sem = Arc::new(WriteSemaphore::new(1));
        let bouncer = WriteBouncer::try_new(sem.clone()).unwrap();
        assert!(matches!(
            WriteBouncer::try_new(sem.clone()),
            Err(BlobStoreError::ResourcesExhausted)
        ));
        drop(bouncer);
        assert_eq!(sem.available(), 1);
    }

    #[test]
    fn release_is_exactly_once() {
        let sem = Arc::new(WriteSemaphore::new(1));
        let bouncer = WriteBouncer::try_new(sem.clone()).unwrap();

        bouncer.release();
        bouncer.release();
        bouncer.release();
        assert_eq!(sem.available(), 1);

        // Drop after an explicit release must not over-release either.
        drop(bouncer);
        assert_eq!(sem.available(), 1);
    }

    #[test]
    fn concurrent_release_reaches_semaphore_once() {
        let sem = Arc::new(WriteSemaphore::new(1));
        let bouncer = Arc::new(WriteBouncer::try_new(sem.clone()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let bouncer = bouncer.clone();
                std::thread::spawn(move || bouncer.release())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(sem.available(), 1);
    }
}
