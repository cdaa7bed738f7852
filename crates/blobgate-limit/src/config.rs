use serde::Deserialize;

use crate::limiter::WriteLimiter;

#[derive(Debug, Clone, Deserialize)]
pub struct WriteLimitConfig {
    /// Maximum number of concurrent write handles across all wrapped
    /// stores. Fixed once the limiter is built.
    pub max_concurrent_writes: usize,
}

impl WriteLimitConfig {
    pub fn defaults() -> Self {
        Self {
            max_concurrent_writes: 8,
        }
    }

    pub fn limiter(&self) -> WriteLimiter {
        WriteLimiter::new(self.max_concurrent_writes)
    }
}
