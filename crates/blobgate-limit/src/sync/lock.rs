use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Blocking sibling of [`WriteSemaphore`](super::WriteSemaphore):
/// `acquire` waits for a free slot instead of failing.
///
/// Cancellation is the async-native kind: dropping the `acquire` future at
/// its await point (for example when it loses a `tokio::select!` race or a
/// `tokio::time::timeout` fires) leaves no permit held and needs no
/// cleanup.
pub struct CancellableLock {
    inner: Arc<Semaphore>,
    permits: usize,
}

impl CancellableLock {
    pub fn new(permits: usize) -> Self {
        Self {
            inner: Arc::new(Semaphore::new(permits)),
            permits,
        }
    }

    /// Wait until a slot is free. Cancel-safe: abandoning the future grants
    /// nothing.
    pub async fn acquire(&self) -> LockGuard {
        self.inner
            .acquire()
            .await
            .expect("semaphore is never closed")
            .forget();
        LockGuard {
            permits: self.inner.clone(),
            released: AtomicBool::new(false),
        }
    }

    /// Non-blocking variant.
    pub fn try_acquire(&self) -> Option<LockGuard> {
        let permit = self.inner.try_acquire().ok()?;
        permit.forget();
        Some(LockGuard {
            permits: self.inner.clone(),
            released: AtomicBool::new(false),
        })
    }

    pub fn available(&self) -> usize {
        self.inner.available_permits()
    }

    pub fn permits(&self) -> usize {
        self.permits
    }
}

/// Holds one slot of a [`CancellableLock`]. Released explicitly (any number
/// of times; only the first has an effect) or on drop.
pub struct LockGuard {
    permits: Arc<Semaphore>,
    released: AtomicBool,
}

impl LockGuard {
    pub fn release(&self) {
        if self
            .released
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.permits.add_permits(1);
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.release();
    }
}
