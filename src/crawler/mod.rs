//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and failure classification
//! - HTML parsing into page records
//! - The fetch concurrency limiter
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod limiter;
mod parser;

pub use coordinator::{run_crawl, Coordinator, CrawlOutcome};
pub use fetcher::{
    build_http_client, fetch_url, is_document_content_type, FetchResult, HttpFetcher, PageFetcher,
};
pub use limiter::{ConcurrencyLimiter, FetchPermit};
pub use parser::extract_page;

use crate::config::Config;
use crate::HarvestError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the seed and limits
/// 2. Build the HTTP client
/// 3. Fetch the seed and fan out over same-domain links
/// 4. Stop admitting pages once the page budget is spent
///
/// # Arguments
///
/// * `seed` - Absolute HTTP(S) address to start from
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Every page record collected, plus failures
/// * `Err(HarvestError)` - The crawl could not start or hit an internal error
pub async fn crawl(seed: &str, config: &Config) -> Result<CrawlOutcome, HarvestError> {
    run_crawl(seed, config).await
}
