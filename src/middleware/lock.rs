//! Request serialization middleware
//!
//! A single async mutex held for the full lifetime of a request, so that
//! requests are processed one at a time. For handlers that are not safe
//! to run concurrently; disabled by default.

use tokio::sync::{Mutex, MutexGuard};

/// The request lock. One instance guards the whole pipeline.
pub struct RequestLock {
    inner: Mutex<()>,
}

impl RequestLock {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(()),
        }
    }

    /// Acquire the lock. The returned guard must be held until the
    /// response has been fully produced.
    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.inner.lock().await
    }
}

impl Default for RequestLock {
    fn default() -> Self {
        Self::new()
    }
}
