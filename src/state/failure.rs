//! Failure classification for pages that were reserved but never committed
//!
//! A failed page keeps its reservation: it counts toward the page budget and
//! is never fetched again during the same crawl.

use std::fmt;

/// Why a reserved page produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    /// Page returned HTTP 404 or 410
    DeadLink,

    /// Page returned some other non-2xx status
    HttpStatus,

    /// Page Content-Type is not an HTML document
    ContentMismatch,

    /// Page could not be reached (connection refused, DNS failure, timeout)
    Unreachable,

    /// Any other transport failure, such as a body that could not be read
    Failed,
}

impl FailureKind {
    /// Stable lowercase name used in logs and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeadLink => "dead_link",
            Self::HttpStatus => "http_status",
            Self::ContentMismatch => "content_mismatch",
            Self::Unreachable => "unreachable",
            Self::Failed => "failed",
        }
    }

    /// Returns all failure kinds
    pub fn all() -> [Self; 5] {
        [
            Self::DeadLink,
            Self::HttpStatus,
            Self::ContentMismatch,
            Self::Unreachable,
            Self::Failed,
        ]
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A page that was reserved and attempted, but yielded no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlFailure {
    /// The address that was fetched
    pub url: String,

    /// Failure classification
    pub kind: FailureKind,

    /// Human-readable reason, e.g. `HTTP 500` or `Expected HTML, got image/png`
    pub reason: String,
}

impl fmt::Display for CrawlFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}: {})", self.url, self.kind, self.reason)
    }
}
