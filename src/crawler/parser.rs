//! HTML parser for extracting page records
//!
//! This module reduces an HTML document to a [`PageRecord`]:
//! - The first `<h1>` heading
//! - The leading paragraph, preferring the `<main>` region
//! - Outgoing links (from `<a href>`)
//! - Image sources (from `<img src>`)
//!
//! Extraction never fails. Malformed markup is repaired by the HTML5 parser and
//! anything that cannot be found comes back empty.

use crate::state::PageRecord;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Parses HTML content and builds the page record for `page_url`
///
/// # Extraction Rules
///
/// - **Heading**: text of the first `h1` in document order, or empty
/// - **Summary**: first `p` inside `main` if there is one, else the first `p`
///   anywhere, else empty
/// - **Links / images**: every `a[href]` / `img[src]` whose attribute is non-empty,
///   resolved against `page_url`, in document order. Missing or empty attributes are
///   skipped, as are references that cannot be resolved.
///
/// # Example
///
/// ```
/// use sumi_harvest::crawler::extract_page;
/// use url::Url;
///
/// let html = r#"<html><body><h1>Test</h1><a href="/page">Link</a></body></html>"#;
/// let page_url = Url::parse("https://example.com/").unwrap();
/// let record = extract_page(html, &page_url);
/// assert_eq!(record.heading, "Test");
/// assert_eq!(record.outgoing_links, vec!["https://example.com/page"]);
/// ```
pub fn extract_page(html: &str, page_url: &Url) -> PageRecord {
    let document = Html::parse_document(html);

    PageRecord {
        url: page_url.to_string(),
        heading: extract_heading(&document),
        summary: extract_summary(&document),
        outgoing_links: extract_references(&document, "a[href]", "href", page_url),
        image_urls: extract_references(&document, "img[src]", "src", page_url),
    }
}

/// Extracts the text of the first `h1`
fn extract_heading(document: &Html) -> String {
    first_text(document, "h1").unwrap_or_default()
}

/// Extracts the leading paragraph, preferring the main content region
fn extract_summary(document: &Html) -> String {
    first_text(document, "main p")
        .or_else(|| first_text(document, "p"))
        .unwrap_or_default()
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next().map(element_text)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Collects resolved values of `attribute` for every element matching `selector`
fn extract_references(document: &Html, selector: &str, attribute: &str, base_url: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attribute))
        .filter_map(|reference| resolve_reference(reference, base_url))
        .collect()
}

/// Resolves a reference against the page URL
///
/// Returns None for empty references and for ones the URL parser rejects.
fn resolve_reference(reference: &str, base_url: &Url) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    base_url.join(reference).ok().map(|url| url.to_string())
}
