//! # blobgate-limit
//!
//! Bounds the number of simultaneous blob uploads against any
//! [`BlobStorePort`](blobgate_core::BlobStorePort) backend.
//!
//! A [`WriteLimiter`] owns one shared [`WriteSemaphore`] and wraps stores
//! in [`LimitedBlobStore`] decorators bound to it, so one write budget is
//! enforced across every store the limiter wraps. A gated `create` or
//! `resume` either takes a permit through a [`WriteBouncer`] or fails
//! immediately with `ResourcesExhausted` — excess demand is rejected, never
//! queued. Retry and backoff policy belongs to the caller.
//!
//! [`CancellableLock`] is the blocking sibling for callers that prefer
//! waiting to rejection; the store decorator deliberately does not use it.

mod bouncer;
mod config;
mod limiter;
mod store;
pub mod sync;
mod writer;

pub use bouncer::WriteBouncer;
pub use config::WriteLimitConfig;
pub use limiter::WriteLimiter;
pub use store::LimitedBlobStore;
pub use sync::{CancellableLock, LockGuard, WriteSemaphore};
pub use writer::LimitedBlobWriter;
