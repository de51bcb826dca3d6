//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end through the real HTTP fetcher.

use sumi_harvest::config::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use sumi_harvest::crawler::{crawl, Coordinator};
use sumi_harvest::output::{write_csv_report, REPORT_HEADERS};
use sumi_harvest::state::FailureKind;
use sumi_harvest::HarvestError;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with the given limits
fn create_test_config(max_concurrency: u32, max_pages: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_concurrency,
            max_pages,
            request_timeout: 5,
            connect_timeout: 2,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig::default(),
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body),
        "text/html; charset=utf-8",
    )
}

/// Mounts an HTML page that is expected to be fetched exactly `times` times
async fn mount_page(server: &MockServer, route: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<h1>Home</h1><main><p>Start here</p></main>
            <a href="/page1">Page 1</a>
            <a href="{}/page2/">Page 2</a>
            <img src="/logo.png">"#,
            base_url
        ),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        r#"<h1>Page One</h1><p>First</p><a href="/">Home</a><a href="/page2">Two</a>"#,
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/page2/",
        r#"<h1>Page Two</h1><p>Second</p><a href="/page1#top">One</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html("<h1>Page Two</h1>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let outcome = crawl(&format!("{}/", base_url), &create_test_config(3, 50))
        .await
        .expect("crawl should succeed");

    assert_eq!(outcome.len(), 3);
    assert!(outcome.failures.is_empty());
    assert!(!outcome.budget_exhausted);

    let headings: Vec<&str> = outcome.records().map(|r| r.heading.as_str()).collect();
    assert!(headings.contains(&"Home"));
    assert!(headings.contains(&"Page One"));
    assert!(headings.contains(&"Page Two"));

    let home = outcome
        .records()
        .find(|r| r.heading == "Home")
        .expect("home page collected");
    assert_eq!(home.summary, "Start here");
    assert_eq!(home.image_urls, vec![format!("{}/logo.png", base_url)]);
}

#[tokio::test]
async fn test_foreign_domain_never_fetched() {
    let site = MockServer::start().await;
    let foreign = MockServer::start().await;

    mount_page(
        &site,
        "/",
        &format!(
            r#"<h1>Home</h1><a href="{}/elsewhere">Away</a><a href="/local">Local</a>"#,
            foreign.uri()
        ),
        1,
    )
    .await;
    mount_page(&site, "/local", "<h1>Local</h1>", 1).await;
    Mock::given(method("GET"))
        .respond_with(html("<h1>Foreign</h1>"))
        .expect(0)
        .mount(&foreign)
        .await;

    let outcome = crawl(&site.uri(), &create_test_config(2, 50)).await.unwrap();

    assert_eq!(outcome.len(), 2);
    for record in outcome.records() {
        assert!(record.url.starts_with(&site.uri()), "unexpected page {}", record.url);
    }
}

#[tokio::test]
async fn test_single_page_budget() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<h1>Home</h1><a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#,
        1,
    )
    .await;
    for route in ["/a", "/b", "/c"] {
        mount_page(&mock_server, route, "<h1>Child</h1>", 0).await;
    }

    let outcome = crawl(&mock_server.uri(), &create_test_config(4, 1))
        .await
        .unwrap();

    assert_eq!(outcome.len(), 1);
    assert_eq!(outcome.reserved, 1);
    assert!(outcome.budget_exhausted);
    assert_eq!(outcome.records().next().map(|r| r.heading.as_str()), Some("Home"));
}

/// Crawls a hub page linking to ten leaves with a budget of four pages
async fn crawl_hub_with_budget(max_concurrency: u32) {
    let mock_server = MockServer::start().await;

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/p{}">P{}</a>"#, i, i))
        .collect();
    mount_page(&mock_server, "/", &format!("<h1>Hub</h1>{}", links), 1).await;
    Mock::given(method("GET"))
        .respond_with(html(r#"<h1>Leaf</h1><a href="/">Hub</a>"#))
        .mount(&mock_server)
        .await;

    let outcome = crawl(&mock_server.uri(), &create_test_config(max_concurrency, 4))
        .await
        .unwrap();

    assert_eq!(outcome.reserved, 4);
    assert_eq!(outcome.len(), 4);
    assert!(outcome.failures.is_empty());
    assert!(outcome.budget_exhausted);

    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 4);
}

#[tokio::test]
async fn test_page_budget_filled_serially() {
    crawl_hub_with_budget(1).await;
}

#[tokio::test]
async fn test_page_budget_filled_in_parallel() {
    crawl_hub_with_budget(3).await;
}

#[tokio::test]
async fn test_shared_page_fetched_once() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<h1>Home</h1><a href="/left">L</a><a href="/right">R</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/left", r#"<a href="/shared">S</a>"#, 1).await;
    mount_page(&mock_server, "/right", r#"<a href="/shared/">S</a>"#, 1).await;

    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(html("<h1>Shared</h1>"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/shared/"))
        .respond_with(html("<h1>Shared</h1>"))
        .mount(&mock_server)
        .await;

    let outcome = crawl(&mock_server.uri(), &create_test_config(4, 50))
        .await
        .unwrap();

    assert_eq!(outcome.len(), 4);
    let shared = outcome
        .records()
        .filter(|r| r.heading == "Shared")
        .count();
    assert_eq!(shared, 1);

    let shared_requests = mock_server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path().starts_with("/shared"))
        .count();
    assert_eq!(shared_requests, 1);
}

#[tokio::test]
async fn test_failures_recorded_and_crawl_continues() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<h1>Home</h1>
        <a href="/missing">Missing</a>
        <a href="/broken">Broken</a>
        <a href="/file.pdf">PDF</a>
        <a href="/ok">OK</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/ok", "<h1>Fine</h1>", 1).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/file.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = crawl(&mock_server.uri(), &create_test_config(2, 50))
        .await
        .unwrap();

    assert_eq!(outcome.len(), 2);
    assert_eq!(outcome.failures.len(), 3);
    assert_eq!(outcome.reserved, 5);

    let kind_of = |suffix: &str| {
        outcome
            .failures
            .iter()
            .find(|f| f.url.ends_with(suffix))
            .map(|f| f.kind)
    };
    assert_eq!(kind_of("/missing"), Some(FailureKind::DeadLink));
    assert_eq!(kind_of("/broken"), Some(FailureKind::HttpStatus));
    assert_eq!(kind_of("/file.pdf"), Some(FailureKind::ContentMismatch));
}

#[tokio::test]
async fn test_user_agent_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact; test@example.com)",
        ))
        .respond_with(html("<h1>Home</h1>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = crawl(&mock_server.uri(), &create_test_config(1, 5))
        .await
        .unwrap();
    assert_eq!(outcome.len(), 1);
}

#[tokio::test]
async fn test_redirect_resolves_links_from_final_location() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "/docs/index.html"),
        )
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/docs/index.html",
        r#"<h1>Docs</h1><a href="guide.html">Guide</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/docs/guide.html", "<h1>Guide</h1>", 1).await;

    let outcome = crawl(&mock_server.uri(), &create_test_config(2, 50))
        .await
        .unwrap();

    let headings: Vec<&str> = outcome.records().map(|r| r.heading.as_str()).collect();
    assert!(headings.contains(&"Docs"));
    assert!(headings.contains(&"Guide"));
}

#[tokio::test]
async fn test_unreachable_seed_yields_empty_report() {
    // Bind and drop a server so the port is very likely closed
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let outcome = crawl(&uri, &create_test_config(1, 5)).await.unwrap();

    assert!(outcome.is_empty());
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].kind, FailureKind::Unreachable);

    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("report.csv");
    write_csv_report(outcome.records(), &report, ";").unwrap();

    let contents = std::fs::read_to_string(&report).unwrap();
    assert_eq!(contents.trim_end(), REPORT_HEADERS.join(","));
}

#[tokio::test]
async fn test_report_written_from_crawl() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<h1>Welcome</h1><main><p>Hello world</p></main><a href="/about">About</a>"#,
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/about",
        r#"<h1>About</h1><p>Us</p><img src="/a.png"><img src="/b.png">"#,
        1,
    )
    .await;

    let config = create_test_config(2, 10);
    let outcome = crawl(&mock_server.uri(), &config).await.unwrap();

    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join(&config.output.report_path);
    write_csv_report(outcome.records(), &report, &config.output.list_delimiter).unwrap();

    let mut reader = csv::Reader::from_path(&report).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);

    let about = rows
        .iter()
        .find(|row| &row[1] == "About")
        .expect("about row present");
    assert_eq!(
        &about[4],
        format!("{0}/a.png;{0}/b.png", mock_server.uri())
    );

    let welcome = rows
        .iter()
        .find(|row| &row[1] == "Welcome")
        .expect("welcome row present");
    assert_eq!(&welcome[2], "Hello world");
    assert_eq!(&welcome[3], format!("{}/about", mock_server.uri()));
}

#[test]
fn test_invalid_seed_rejected_before_crawling() {
    let config = create_test_config(1, 1);

    let result = Coordinator::new("not a url", &config);
    assert!(matches!(result, Err(HarvestError::UrlError(_))));

    let result = Coordinator::new("mailto:someone@example.com", &config);
    assert!(matches!(result, Err(HarvestError::UrlError(_))));
}
