//! Page budget enforcement
//!
//! The governor owns the crawl's stop flag. It is tripped at most once, from inside
//! the ledger's critical section, on the first reservation attempt that finds the
//! budget already spent. Units that have not reserved yet see the flag and abandon;
//! units holding a reservation always run to completion.

use std::sync::atomic::{AtomicBool, Ordering};

/// Tracks the page budget and signals a global stop once it is exhausted
#[derive(Debug)]
pub struct PageGovernor {
    /// Maximum number of keys the ledger may hold
    max_pages: usize,

    /// Monotonic stop flag, readable without taking the ledger lock
    stopped: AtomicBool,
}

impl PageGovernor {
    /// Creates a governor for the given page budget
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages,
            stopped: AtomicBool::new(false),
        }
    }

    /// The configured page budget
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Returns true if a ledger of `size` keys has no room left
    pub fn budget_exceeded(&self, size: usize) -> bool {
        size >= self.max_pages
    }

    /// Returns true once the governor has been tripped
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Sets the stop flag
    ///
    /// Must be called with the ledger lock held. Returns true only for the call
    /// that actually flipped the flag.
    pub(crate) fn trip(&self) -> bool {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return false;
        }

        tracing::info!(
            "Page budget of {} reached, no further pages will be reserved",
            self.max_pages
        );
        true
    }
}
