//! Concurrency limiter for page fetches
//!
//! A counting gate in front of the fetch step only. Normalization, reservation and
//! link discovery run freely; only network IO waits for a slot.

use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds the number of simultaneous fetches
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    /// Global semaphore for limiting concurrent fetches
    semaphore: Arc<Semaphore>,

    capacity: NonZeroUsize,
}

/// One occupied fetch slot; the slot is released when this is dropped
#[derive(Debug)]
pub struct FetchPermit {
    _permit: OwnedSemaphorePermit,
}

impl FetchPermit {
    /// Releases the slot explicitly
    pub fn release(self) {}
}

impl ConcurrencyLimiter {
    /// Creates a limiter with `capacity` slots. A capacity of one serializes fetches.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity.get())),
            capacity,
        }
    }

    /// Waits until a slot is free and takes it
    ///
    /// Returns None only if the limiter has been closed, which never happens
    /// during a crawl.
    pub async fn acquire(&self) -> Option<FetchPermit> {
        let permit = self.semaphore.clone().acquire_owned().await.ok()?;
        Some(FetchPermit { _permit: permit })
    }

    /// Number of configured slots
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Number of slots currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
