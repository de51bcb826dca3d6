//! Statistics generation from a crawl outcome
//!
//! This module provides functionality for summarizing and displaying
//! what a finished crawl collected and where it failed.

use crate::crawler::CrawlOutcome;
use crate::state::{CrawlFailure, FailureKind};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// The seed address
    pub seed: String,

    /// Number of completed page records
    pub pages_collected: usize,

    /// Number of keys reserved in the ledger
    pub pages_reserved: usize,

    /// Total number of links found across all collected pages
    pub total_links: usize,

    /// Failure counts by kind
    pub failures_by_kind: HashMap<FailureKind, usize>,

    /// Every failure, in the order it was recorded
    pub failures: Vec<CrawlFailure>,

    /// Whether the page budget stopped the crawl
    pub budget_exhausted: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlStatistics {
    /// Builds statistics from a finished crawl
    pub fn from_outcome(outcome: &CrawlOutcome) -> Self {
        let mut failures_by_kind = HashMap::new();
        for failure in &outcome.failures {
            *failures_by_kind.entry(failure.kind).or_insert(0) += 1;
        }

        Self {
            seed: outcome.seed.clone(),
            pages_collected: outcome.len(),
            pages_reserved: outcome.reserved,
            total_links: outcome.records().map(|r| r.outgoing_links.len()).sum(),
            failures_by_kind,
            failures: outcome.failures.clone(),
            budget_exhausted: outcome.budget_exhausted,
            started_at: outcome.started_at,
            finished_at: outcome.finished_at,
        }
    }

    /// Total number of failed pages
    pub fn total_failures(&self) -> usize {
        self.failures.len()
    }

    /// Wall-clock duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Prints statistics to stderr in a formatted manner
///
/// stdout is reserved for the page listing.
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    eprintln!("=== Crawl Statistics ===\n");

    eprintln!("Overview:");
    eprintln!("  Seed: {}", stats.seed);
    eprintln!("  Started: {}", stats.started_at.to_rfc3339());
    eprintln!("  Duration: {:.2}s", stats.duration_seconds());
    eprintln!("  Pages collected: {}", stats.pages_collected);
    eprintln!("  Pages reserved: {}", stats.pages_reserved);
    eprintln!("  Total links found: {}", stats.total_links);
    if stats.budget_exhausted {
        eprintln!("  Page budget reached; crawl stopped early");
    }
    eprintln!();

    if !stats.failures_by_kind.is_empty() {
        eprintln!("Failures by Kind:");
        for kind in FailureKind::all() {
            if let Some(count) = stats.failures_by_kind.get(&kind) {
                eprintln!("  {}: {}", kind, count);
            }
        }
        eprintln!();

        eprintln!("Failed Pages ({}):", stats.total_failures());
        for failure in &stats.failures {
            eprintln!("  - {} ({})", failure.url, failure.reason);
        }
        eprintln!();
    }

    let attempted = stats.pages_collected + stats.total_failures();
    let success_rate = if attempted > 0 {
        (stats.pages_collected as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    eprintln!(
        "Success Rate: {:.1}% ({} / {} fetched pages collected)",
        success_rate, stats.pages_collected, attempted
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PageRecord;
    use crate::url::normalize_url;
    use std::collections::BTreeMap;

    fn outcome() -> CrawlOutcome {
        let mut pages = BTreeMap::new();
        pages.insert(
            normalize_url("https://example.com/").unwrap(),
            PageRecord {
                url: "https://example.com/".to_string(),
                outgoing_links: vec![
                    "https://example.com/a".to_string(),
                    "https://example.com/gone".to_string(),
                ],
                ..PageRecord::default()
            },
        );
        pages.insert(
            normalize_url("https://example.com/a").unwrap(),
            PageRecord {
                url: "https://example.com/a".to_string(),
                outgoing_links: vec!["https://example.com/".to_string()],
                ..PageRecord::default()
            },
        );

        let started_at = Utc::now();
        CrawlOutcome {
            seed: "https://example.com/".to_string(),
            pages,
            failures: vec![CrawlFailure {
                url: "https://example.com/gone".to_string(),
                kind: FailureKind::DeadLink,
                reason: "HTTP 404".to_string(),
            }],
            reserved: 3,
            budget_exhausted: true,
            started_at,
            finished_at: started_at + chrono::Duration::milliseconds(1500),
        }
    }

    #[test]
    fn test_statistics_from_outcome() {
        let stats = CrawlStatistics::from_outcome(&outcome());

        assert_eq!(stats.pages_collected, 2);
        assert_eq!(stats.pages_reserved, 3);
        assert_eq!(stats.total_links, 3);
        assert_eq!(stats.total_failures(), 1);
        assert_eq!(stats.failures_by_kind.get(&FailureKind::DeadLink), Some(&1));
        assert!(stats.budget_exhausted);
        assert!((stats.duration_seconds() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_print_statistics_does_not_panic() {
        print_statistics(&CrawlStatistics::from_outcome(&outcome()));
    }
}
