//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageRecord`: What one successfully fetched page boils down to
//! - `VisitLedger`: Shared map of reserved and completed pages, guarded by one lock
//! - `PageGovernor`: Page budget and the one-shot stop flag
//! - `CrawlFailure`: Why a reserved page never produced a record

mod failure;
mod governor;
mod ledger;
mod page_record;

// Re-export main types
pub use failure::{CrawlFailure, FailureKind};
pub use governor::PageGovernor;
pub use ledger::{Reservation, VisitLedger};
pub use page_record::PageRecord;
