use tokio::sync::Semaphore;

/// Fixed-capacity permit pool with a non-blocking acquire.
///
/// Acquired permits are forgotten and handed back through [`release`];
/// the pool itself never tracks who holds what. The caller must call
/// `release` exactly once per successful `try_acquire` — violating that
/// would grow the pool past its capacity, which is why callers go through
/// a [`WriteBouncer`](crate::WriteBouncer) instead of touching the
/// semaphore directly.
///
/// [`release`]: WriteSemaphore::release
pub struct WriteSemaphore {
    inner: Semaphore,
    capacity: usize,
}

impl WriteSemaphore {
    /// Capacity is fixed for the life of the pool and clamped to the
    /// runtime's permit ceiling ([`Semaphore::MAX_PERMITS`]). A capacity of
    /// zero admits nothing: every `try_acquire` fails.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(Semaphore::MAX_PERMITS);
        Self {
            inner: Semaphore::new(capacity),
            capacity,
        }
    }

    /// Take a permit if one is free. Never blocks.
    pub fn try_acquire(&self) -> bool {
        match self.inner.try_acquire() {
            Ok(permit) => {
                permit.forget();
                true
            }
            Err(_) => false,
        }
    }

    /// Return one permit to the pool.
    pub fn release(&self) {
        self.inner.add_permits(1);
    }

    pub fn available(&self) -> usize {
        self.inner.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
