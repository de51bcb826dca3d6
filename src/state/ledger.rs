//! The visit ledger
//!
//! Every canonical key the crawl decides to fetch passes through here exactly once.
//! Membership, the budget check, and insertion of the placeholder happen in a
//! single critical section, so two units racing on the same key cannot both win.
//! No IO is ever performed while the lock is held.

use crate::state::failure::CrawlFailure;
use crate::state::governor::PageGovernor;
use crate::state::page_record::PageRecord;
use crate::url::CanonicalKey;
use crate::HarvestError;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Outcome of a reservation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// The caller now owns the right to fetch this key
    Granted,

    /// The key was reserved earlier, by this or another unit
    AlreadySeen,

    /// The page budget is spent; the crawl is stopping
    BudgetExhausted,
}

impl Reservation {
    /// Returns true if the caller may go on to fetch
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Per-key state. Never removed once inserted.
#[derive(Debug)]
enum Slot {
    /// Fetch in progress
    Reserved,

    /// Fetch finished without a record; still counts toward the budget
    Failed,

    /// Fetch and extraction succeeded
    Completed(PageRecord),
}

#[derive(Debug, Default)]
struct LedgerInner {
    slots: HashMap<CanonicalKey, Slot>,

    /// Keys in the order their records were committed
    committed: Vec<CanonicalKey>,

    failures: Vec<CrawlFailure>,
}

/// Shared map from canonical key to reservation or completed record
#[derive(Debug)]
pub struct VisitLedger {
    inner: Mutex<LedgerInner>,
    governor: PageGovernor,
}

impl VisitLedger {
    /// Creates an empty ledger bounded by `max_pages`
    pub fn new(max_pages: usize) -> Self {
        Self {
            inner: Mutex::new(LedgerInner::default()),
            governor: PageGovernor::new(max_pages),
        }
    }

    /// The governor enforcing this ledger's page budget
    pub fn governor(&self) -> &PageGovernor {
        &self.governor
    }

    // Critical sections never panic part way through an update, so a poisoned
    // lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, LedgerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically checks that `key` is new and the budget has room, then reserves it
    ///
    /// The first attempt that finds the budget spent trips the governor's stop flag.
    /// A granted reservation is never revoked.
    pub fn try_reserve(&self, key: &CanonicalKey) -> Reservation {
        let mut inner = self.lock();

        if self.governor.is_stopped() {
            return Reservation::BudgetExhausted;
        }

        if inner.slots.contains_key(key) {
            return Reservation::AlreadySeen;
        }

        if self.governor.budget_exceeded(inner.slots.len()) {
            self.governor.trip();
            return Reservation::BudgetExhausted;
        }

        inner.slots.insert(key.clone(), Slot::Reserved);
        tracing::trace!(
            "Reserved {} ({} of {})",
            key,
            inner.slots.len(),
            self.governor.max_pages()
        );
        Reservation::Granted
    }

    /// Replaces the reservation for `key` with its completed record
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::InvariantViolation` if `key` is not currently reserved.
    /// That can only happen through a logic bug and must abort the crawl.
    pub fn commit(&self, key: &CanonicalKey, record: PageRecord) -> Result<(), HarvestError> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        let slot = inner
            .slots
            .get_mut(key)
            .ok_or_else(|| violation(key, "commit without a reservation"))?;
        match *slot {
            Slot::Reserved => {}
            Slot::Failed => {
                return Err(violation(key, "commit after the fetch was recorded as failed"))
            }
            Slot::Completed(_) => return Err(violation(key, "record committed twice")),
        }
        *slot = Slot::Completed(record);

        inner.committed.push(key.clone());
        Ok(())
    }

    /// Records that the fetch for `key` failed
    ///
    /// The key keeps its place in the ledger, so it still counts toward the budget
    /// and is never fetched again.
    ///
    /// # Errors
    ///
    /// Same invariant as [`VisitLedger::commit`].
    pub fn record_failure(
        &self,
        key: &CanonicalKey,
        failure: CrawlFailure,
    ) -> Result<(), HarvestError> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        let slot = inner
            .slots
            .get_mut(key)
            .ok_or_else(|| violation(key, "failure recorded without a reservation"))?;
        match *slot {
            Slot::Reserved => {}
            Slot::Failed => return Err(violation(key, "failure recorded twice")),
            Slot::Completed(_) => return Err(violation(key, "failure recorded after commit")),
        }
        *slot = Slot::Failed;

        inner.failures.push(failure);
        Ok(())
    }

    /// Number of reserved, failed, or completed keys
    pub fn size(&self) -> usize {
        self.lock().slots.len()
    }

    /// Completed records in commit order
    pub fn snapshot(&self) -> Vec<(CanonicalKey, PageRecord)> {
        let inner = self.lock();
        inner
            .committed
            .iter()
            .filter_map(|key| match inner.slots.get(key) {
                Some(Slot::Completed(record)) => Some((key.clone(), record.clone())),
                _ => None,
            })
            .collect()
    }

    /// Failures recorded so far, in the order they happened
    pub fn failures(&self) -> Vec<CrawlFailure> {
        self.lock().failures.clone()
    }
}

fn violation(key: &CanonicalKey, message: &str) -> HarvestError {
    HarvestError::InvariantViolation {
        key: key.to_string(),
        message: message.to_string(),
    }
}
