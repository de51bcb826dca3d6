//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with a proper user agent string
//! - GET requests to fetch page content
//! - Error classification into failure kinds
//!
//! Fetch failures are values, never errors: a 404 or a PDF ends one branch of
//! the crawl and nothing else.

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::state::{CrawlFailure, FailureKind};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Content types accepted as HTML documents
const DOCUMENT_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Result of a fetch operation
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Non-2xx HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
        /// The failure kind this status maps to
        kind: FailureKind,
    },

    /// Network error (connection refused, timeout, unreadable body, etc.)
    NetworkError {
        /// Error description
        error: String,
        /// The failure kind this error maps to
        kind: FailureKind,
    },
}

impl FetchResult {
    /// Converts a failed fetch into a failure record; None for `Success`
    pub fn into_failure(self, url: &str) -> Option<CrawlFailure> {
        let (kind, reason) = match self {
            Self::Success { .. } => return None,
            Self::ContentMismatch { content_type } => (
                FailureKind::ContentMismatch,
                format!("Expected HTML, got {}", content_type),
            ),
            Self::HttpError { status_code, kind } => (kind, format!("HTTP {}", status_code)),
            Self::NetworkError { error, kind } => (kind, error),
        };

        Some(CrawlFailure {
            url: url.to_string(),
            kind,
            reason,
        })
    }
}

/// Source of page documents for the crawler
///
/// Implementations must report failures through [`FetchResult`] rather than panicking.
pub trait PageFetcher: Send + Sync + 'static {
    /// Fetches one page
    fn fetch(&self, url: &Url) -> impl Future<Output = FetchResult> + Send;
}

/// Fetcher backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher with its own HTTP client
    pub fn new(user_agent: &UserAgentConfig, crawler: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent, crawler)?,
        })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> FetchResult {
        fetch_url(&self.client, url.as_str()).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `crawler` - Timeouts come from here
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::config::{CrawlerConfig, UserAgentConfig};
/// use sumi_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with HTML Content-Type | Success |
/// | 2xx with any other Content-Type | ContentMismatch |
/// | HTTP 404 / 410 | HttpError → DeadLink |
/// | Other non-2xx | HttpError → HttpStatus |
/// | Timeout / connection refused | NetworkError → Unreachable |
/// | Anything else | NetworkError → Failed |
///
/// No retries are attempted.
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_transport_error(&e),
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        let kind = match status {
            StatusCode::NOT_FOUND | StatusCode::GONE => FailureKind::DeadLink,
            _ => FailureKind::HttpStatus,
        };
        return FetchResult::HttpError {
            status_code: status.as_u16(),
            kind,
        };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_document_content_type(&content_type) {
        return FetchResult::ContentMismatch { content_type };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: format!("Failed to read body: {}", e),
            kind: FailureKind::Failed,
        },
    }
}

fn classify_transport_error(e: &reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            kind: FailureKind::Unreachable,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: "Connection refused".to_string(),
            kind: FailureKind::Unreachable,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            kind: FailureKind::Failed,
        }
    }
}

/// Returns true if the Content-Type names an HTML document
pub fn is_document_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    DOCUMENT_CONTENT_TYPES.contains(&mime.as_str())
}
