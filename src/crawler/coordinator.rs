//! Crawler coordinator - main crawl orchestration logic
//!
//! The crawl is a tree of tokio tasks rooted at the seed. Each task handles one
//! discovered address:
//!
//! 1. Abandon if the page budget already stopped the crawl
//! 2. Abandon if the address is off the seed's authority
//! 3. Normalize to a canonical key
//! 4. Reserve the key in the ledger (atomic with the budget check)
//! 5. Wait for a fetch slot; a granted reservation is always fetched
//! 6. Fetch; a failure is logged and recorded, and the key stays spent
//! 7. Extract the page record and commit it
//! 8. Hand the page's links back so one child task is spawned per link
//!
//! The coordinator owns the set of outstanding tasks and returns once it drains.

use crate::config::{validate_crawler_config, Config, CrawlerConfig};
use crate::crawler::fetcher::{FetchResult, HttpFetcher, PageFetcher};
use crate::crawler::limiter::ConcurrencyLimiter;
use crate::crawler::parser::extract_page;
use crate::state::{CrawlFailure, FailureKind, PageRecord, Reservation, VisitLedger};
use crate::url::{canonical_key, extract_authority, is_same_authority, parse_web_url, CanonicalKey};
use crate::{ConfigError, HarvestError, UrlError};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::task::JoinSet;
use url::Url;

/// How often (in finished tasks) progress is logged
const PROGRESS_INTERVAL: usize = 25;

/// Everything collected by one crawl
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// The seed address the crawl started from
    pub seed: String,

    /// Completed page records by canonical key
    pub pages: BTreeMap<CanonicalKey, PageRecord>,

    /// Pages that were reserved and attempted but produced no record
    pub failures: Vec<CrawlFailure>,

    /// Keys held by the ledger at the end (completed or failed)
    pub reserved: usize,

    /// Whether the page budget stopped the crawl
    pub budget_exhausted: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlOutcome {
    /// Number of completed page records
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Returns true if no page was collected
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterates over the completed records in key order
    pub fn records(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.values()
    }

    /// Wall-clock duration of the crawl
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Immutable per-crawl context shared by every task
struct CrawlSession<F> {
    seed: Url,

    /// Domain restriction anchor
    seed_authority: String,

    ledger: VisitLedger,
    limiter: ConcurrencyLimiter,
    fetcher: F,
}

/// Where an address came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// The seed defines the domain and is never filtered by it
    Seed,
    Link,
}

/// Main crawler coordinator structure
pub struct Coordinator<F> {
    session: Arc<CrawlSession<F>>,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Arguments
    ///
    /// * `seed` - Absolute HTTP(S) address to start from
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - Invalid seed, invalid limits, or HTTP client setup failed
    pub fn new(seed: &str, config: &Config) -> Result<Self, HarvestError> {
        let fetcher = HttpFetcher::new(&config.user_agent, &config.crawler)?;
        Self::with_fetcher(seed, &config.crawler, fetcher)
    }
}

impl<F: PageFetcher> Coordinator<F> {
    /// Creates a coordinator around any page fetcher
    pub fn with_fetcher(
        seed: &str,
        crawler: &CrawlerConfig,
        fetcher: F,
    ) -> Result<Self, HarvestError> {
        validate_crawler_config(crawler)?;

        let seed = parse_web_url(seed)?;
        let seed_authority = extract_authority(&seed).ok_or(UrlError::MissingDomain)?;

        let capacity = NonZeroUsize::new(crawler.max_concurrency as usize).ok_or_else(|| {
            ConfigError::Validation("max_concurrency must be a positive integer".to_string())
        })?;

        Ok(Self {
            session: Arc::new(CrawlSession {
                seed,
                seed_authority,
                ledger: VisitLedger::new(crawler.max_pages as usize),
                limiter: ConcurrencyLimiter::new(capacity),
                fetcher,
            }),
        })
    }

    /// Runs the crawl to completion
    ///
    /// The seed is visited first, inline. Its links then fan out as tasks, and every
    /// finished task's links are spawned in turn until nothing is outstanding.
    ///
    /// # Errors
    ///
    /// Only a ledger invariant violation or a panicked task aborts the crawl; all
    /// per-page failures are recorded in the outcome instead. Remaining tasks are
    /// aborted when the error is returned.
    pub async fn run(self) -> Result<CrawlOutcome, HarvestError> {
        let session = self.session;
        let started_at = Utc::now();

        tracing::info!(
            "Starting crawl of {} (max {} pages, {} concurrent fetches)",
            session.seed,
            session.ledger.governor().max_pages(),
            session.limiter.capacity()
        );

        let mut outstanding: JoinSet<Result<Vec<String>, HarvestError>> = JoinSet::new();

        let seed_links = visit(Arc::clone(&session), session.seed.to_string(), Origin::Seed).await?;
        spawn_children(&mut outstanding, &session, seed_links);

        let mut finished = 0usize;
        while let Some(joined) = outstanding.join_next().await {
            let links = joined??;
            spawn_children(&mut outstanding, &session, links);

            finished += 1;
            if finished % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    "Progress: {} tasks finished, {} outstanding, {} pages reserved",
                    finished,
                    outstanding.len(),
                    session.ledger.size()
                );
            }
        }

        let outcome = CrawlOutcome {
            seed: session.seed.to_string(),
            pages: session.ledger.snapshot().into_iter().collect(),
            failures: session.ledger.failures(),
            reserved: session.ledger.size(),
            budget_exhausted: session.ledger.governor().is_stopped(),
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "Crawl completed: {} pages collected, {} failed, in {}ms",
            outcome.len(),
            outcome.failures.len(),
            outcome.duration().num_milliseconds()
        );

        Ok(outcome)
    }
}

/// Spawns one task per discovered link
fn spawn_children<F: PageFetcher>(
    outstanding: &mut JoinSet<Result<Vec<String>, HarvestError>>,
    session: &Arc<CrawlSession<F>>,
    links: Vec<String>,
) {
    // Children of a stopped crawl would only find the budget spent
    if session.ledger.governor().is_stopped() {
        return;
    }

    for link in links {
        outstanding.spawn(visit(Arc::clone(session), link, Origin::Link));
    }
}

/// Processes one discovered address and returns the links found on it
///
/// An empty list means the branch ends here: the address was abandoned, failed,
/// or simply had no links.
async fn visit<F: PageFetcher>(
    session: Arc<CrawlSession<F>>,
    address: String,
    origin: Origin,
) -> Result<Vec<String>, HarvestError> {
    if session.ledger.governor().is_stopped() {
        tracing::trace!("Crawl stopped, abandoning {}", address);
        return Ok(Vec::new());
    }

    let mut url = match Url::parse(&address) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Skipping unparseable address {}: {}", address, e);
            return Ok(Vec::new());
        }
    };

    if origin == Origin::Link && !is_same_authority(&url, &session.seed_authority) {
        tracing::trace!("Skipping off-domain address {}", url);
        return Ok(Vec::new());
    }
    url.set_fragment(None);

    let key = match canonical_key(&url) {
        Ok(key) => key,
        Err(e) => {
            tracing::debug!("Failed to normalize {}: {}", url, e);
            return Ok(Vec::new());
        }
    };

    match session.ledger.try_reserve(&key) {
        Reservation::Granted => {}
        Reservation::AlreadySeen => {
            tracing::trace!("Already visited {}", key);
            return Ok(Vec::new());
        }
        Reservation::BudgetExhausted => {
            tracing::debug!("Page budget exhausted, not visiting {}", key);
            return Ok(Vec::new());
        }
    }

    let Some(permit) = session.limiter.acquire().await else {
        let failure = CrawlFailure {
            url: url.to_string(),
            kind: FailureKind::Failed,
            reason: "Fetch limiter closed".to_string(),
        };
        tracing::warn!("Failed to fetch {}: {}", failure.url, failure.reason);
        session.ledger.record_failure(&key, failure)?;
        return Ok(Vec::new());
    };

    tracing::debug!("Fetching {}", url);
    let result = session.fetcher.fetch(&url).await;

    match result {
        FetchResult::Success {
            final_url, body, ..
        } => {
            // Links resolve against wherever redirects landed; the record keeps
            // the address that was reserved.
            let base = Url::parse(&final_url).unwrap_or_else(|_| url.clone());
            let record = PageRecord {
                url: url.to_string(),
                ..extract_page(&body, &base)
            };
            let links = record.outgoing_links.clone();

            session.ledger.commit(&key, record)?;
            permit.release();

            tracing::debug!("Committed {} with {} links", key, links.len());
            Ok(links)
        }
        failed => {
            permit.release();

            if let Some(failure) = failed.into_failure(url.as_str()) {
                tracing::warn!("Failed to fetch {}: {}", failure.url, failure.reason);
                session.ledger.record_failure(&key, failure)?;
            }
            Ok(Vec::new())
        }
    }
}

/// Runs a complete crawl over HTTP
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::config::Config;
/// use sumi_harvest::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let outcome = run_crawl("https://example.com/", &Config::default()).await?;
/// println!("found {} pages", outcome.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(seed: &str, config: &Config) -> Result<CrawlOutcome, HarvestError> {
    Coordinator::new(seed, config)?.run().await
}
