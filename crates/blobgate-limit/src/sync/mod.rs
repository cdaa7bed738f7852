//! Counting primitives the write gate is built from.

mod lock;
mod semaphore;

pub use lock::{CancellableLock, LockGuard};
pub use semaphore::WriteSemaphore;
