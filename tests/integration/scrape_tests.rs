//! Integration tests for the scraper
//!
//! These tests use wiremock to create mock HTTP servers and run the fetcher
//! and the full pagination cycle end-to-end with zero-width delays.

use product_scrape::config::{Config, DelayConfig};
use product_scrape::crawler::{build_http_client, FetchFailure, Fetcher, RetryPolicy};
use product_scrape::{scrape, Coordinator};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches the first results page, which carries no `page` parameter
struct FirstResultsPage;

impl Match for FirstResultsPage {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == "page")
    }
}

/// Creates a test configuration against the mock server with no delays
fn create_test_config(base_url: &str, max_pages: u32, max_products: usize) -> Config {
    let mut config = Config::new("mobile", base_url, max_pages, max_products);
    config.fetch = config.fetch.without_delays();
    config
}

fn results_page(ids: &[&str]) -> String {
    let cards: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<div class="s-result-item">
                    <a class="a-link-normal s-no-outline" href="/Item-{id}/dp/{id}/ref=sr_1_1?k=mobile">{id}</a>
                </div>"#
            )
        })
        .collect();
    format!("<html><head><title>Results</title></head><body>{}</body></html>", cards)
}

fn product_page(id: &str) -> String {
    format!(
        r#"<html><head><title>{id}</title></head><body>
            <span id="productTitle"> Phone {id} </span>
            <span class="a-price-whole">12,999.</span>
            <span class="a-icon-alt">4.1 out of 5 stars</span>
            <span id="acrCustomerReviewText">1,024 ratings</span>
            <div id="availability"><span> In stock </span></div>
        </body></html>"#
    )
}

async fn mount_results(server: &MockServer, page: Option<&str>, ids: &[&str]) {
    let body = results_page(ids);
    let mock = Mock::given(method("GET")).and(path("/s"));
    let mock = match page {
        Some(page) => mock.and(query_param("page", page)),
        None => mock.and(FirstResultsPage),
    };
    mock.respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_product(server: &MockServer, id: &str, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/Item-{}/dp/{}", id, id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page(id)))
        .expect(expected_hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_persistent_challenge_exhausts_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dp/B1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>Type the characters you see. CAPTCHA</body></html>"),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 1, 10);
    let mut fetcher = Fetcher::new(&config).expect("Failed to create fetcher");

    let result = fetcher.fetch(&format!("{}/dp/B1", mock_server.uri())).await;
    match result {
        Err(FetchFailure::RetriesExhausted { attempts, last }) => {
            assert_eq!(attempts, 3);
            assert_eq!(
                *last,
                FetchFailure::BotChallenge {
                    marker: "captcha".to_string()
                }
            );
        }
        other => panic!("Expected exhausted retries, got {:?}", other),
    }
    // Wiremock verifies expect(3) when the mock server drops
}

#[tokio::test]
async fn test_server_error_then_success() {
    let mock_server = MockServer::start().await;

    // Mounted first, so it answers the first request only
    Mock::given(method("GET"))
        .and(path("/dp/B1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dp/B1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("B1")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 1, 10);
    let mut fetcher = Fetcher::new(&config).expect("Failed to create fetcher");

    let page = fetcher
        .fetch(&format!("{}/dp/B1", mock_server.uri()))
        .await
        .expect("Fetch should succeed on the second attempt");
    assert_eq!(page.status_code, 200);
    assert!(page.body.contains("Phone B1"));
}

#[tokio::test]
async fn test_error_status_body_is_not_inspected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dp/B1"))
        .respond_with(ResponseTemplate::new(404).set_body_string("captcha"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 1, 10);
    let mut fetcher = Fetcher::new(&config).expect("Failed to create fetcher");

    let result = fetcher.fetch(&format!("{}/dp/B1", mock_server.uri())).await;
    match result {
        Err(FetchFailure::RetriesExhausted { last, .. }) => {
            assert_eq!(*last, FetchFailure::HttpStatus { status_code: 404 });
        }
        other => panic!("Expected exhausted retries, got {:?}", other),
    }
}

#[tokio::test]
async fn test_double_scheme_url_is_repaired() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/dp/B1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("B1")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&uri, 1, 10);
    let mut fetcher = Fetcher::new(&config).expect("Failed to create fetcher");

    let page = fetcher
        .fetch(&format!("{}{}/dp/B1", uri, uri))
        .await
        .expect("Repaired URL should be fetched");
    assert!(page.final_url.ends_with("/dp/B1"));
}

#[tokio::test]
async fn test_browser_headers_are_sent() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/dp/B1"))
        .and(header("user-agent", "test-agent/1.0"))
        .and(header("referer", format!("{}/", uri).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("B1")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&uri, 1, 10);
    config.headers.user_agent = "test-agent/1.0".to_string();
    let mut fetcher = Fetcher::new(&config).expect("Failed to create fetcher");

    assert!(fetcher.fetch(&format!("{}/dp/B1", uri)).await.is_ok());
}

#[tokio::test]
async fn test_connection_refused_exhausts_attempts() {
    // Bind and release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);

    let base_url = format!("http://127.0.0.1:{}", port);
    let config = create_test_config(&base_url, 1, 10);
    let mut fetcher = Fetcher::new(&config).expect("Failed to create fetcher");

    let result = fetcher.fetch(&format!("{}/dp/B1", base_url)).await;
    match result {
        Err(FetchFailure::RetriesExhausted { attempts, last }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last, FetchFailure::Transport { .. }));
        }
        other => panic!("Expected exhausted retries, got {:?}", other),
    }
}

#[tokio::test]
async fn test_injected_single_attempt_fetcher() {
    let mock_server = MockServer::start().await;

    mount_results(&mock_server, None, &["B1"]).await;
    Mock::given(method("GET"))
        .and(path("/Item-B1/dp/B1"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), 1, 10);
    config.fetch.max_attempts = 1;

    let client = build_http_client(&config).expect("Failed to build client");
    let fetcher = Fetcher::with_client(client, RetryPolicy::from_config(&config.fetch));
    let coordinator =
        Coordinator::with_fetcher(config, fetcher).expect("Failed to create coordinator");
    let report = coordinator.run().await;

    assert!(report.records.is_empty());
    assert_eq!(report.stats.products_attempted, 1);
    assert_eq!(report.stats.product_fetch_failures, 1);
}

#[tokio::test]
async fn test_cap_stops_run_in_discovery_order() {
    let mock_server = MockServer::start().await;

    mount_results(&mock_server, None, &["B1", "B2"]).await;
    mount_results(&mock_server, Some("2"), &["B3", "B4"]).await;
    mount_product(&mock_server, "B1", 1).await;
    mount_product(&mock_server, "B2", 1).await;
    mount_product(&mock_server, "B3", 1).await;
    // The cap is reached before this product is visited
    mount_product(&mock_server, "B4", 0).await;

    let config = create_test_config(&mock_server.uri(), 2, 3);
    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let report = coordinator.run().await;

    let titles: Vec<&str> = report.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Phone B1", "Phone B2", "Phone B3"]);
    assert!(report.stats.cap_reached);
    assert_eq!(report.stats.products_scraped, 3);

    let first = &report.records[0];
    assert_eq!(first.url, format!("{}/Item-B1/dp/B1", mock_server.uri()));
    assert_eq!(first.price, "₹12,999");
    assert_eq!(first.rating, "4.1");
    assert_eq!(first.reviews, "1024");
    assert_eq!(first.availability, "In stock");
    assert_eq!(first.description, "N/A");
}

#[tokio::test]
async fn test_duplicate_product_fetched_once() {
    let mock_server = MockServer::start().await;

    mount_results(&mock_server, None, &["B1", "B2", "B1"]).await;
    mount_results(&mock_server, Some("2"), &["B2", "B3"]).await;
    mount_product(&mock_server, "B1", 1).await;
    mount_product(&mock_server, "B2", 1).await;
    mount_product(&mock_server, "B3", 1).await;

    let config = create_test_config(&mock_server.uri(), 2, 10);
    let report = scrape(config).await.expect("Scrape failed");

    assert_eq!(report.records.len(), 3);
    assert!(!report.stats.cap_reached);

    let mut urls: Vec<&str> = report.records.iter().map(|r| r.url.as_str()).collect();
    urls.sort_unstable();
    urls.dedup();
    assert_eq!(urls.len(), report.records.len(), "URLs must be unique");
}

#[tokio::test]
async fn test_failed_results_page_is_skipped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s"))
        .and(FirstResultsPage)
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;
    mount_results(&mock_server, Some("2"), &["B1"]).await;
    mount_product(&mock_server, "B1", 1).await;

    let config = create_test_config(&mock_server.uri(), 2, 10);
    let report = scrape(config).await.expect("Scrape failed");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.stats.pages_requested, 2);
    assert_eq!(report.stats.pages_failed, 1);
}

#[tokio::test]
async fn test_failed_results_page_takes_no_page_delay() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s"))
        .and(FirstResultsPage)
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_results(&mock_server, Some("2"), &["B1"]).await;
    mount_product(&mock_server, "B1", 1).await;

    let mut config = create_test_config(&mock_server.uri(), 2, 10);
    config.fetch.max_attempts = 1;
    config.fetch.page_delay = DelayConfig::new(1_500, 1_500);

    let report = scrape(config).await.expect("Scrape failed");

    assert_eq!(report.stats.pages_failed, 1);
    assert_eq!(report.records.len(), 1);
    assert!(
        report.stats.elapsed < Duration::from_millis(1_500),
        "page delay was taken after the failed page: {:?}",
        report.stats.elapsed
    );
}

#[tokio::test]
async fn test_challenged_product_is_skipped() {
    let mock_server = MockServer::start().await;

    mount_results(&mock_server, None, &["B1", "B2"]).await;
    Mock::given(method("GET"))
        .and(path("/Item-B1/dp/B1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Rush Hour: please try again"))
        .expect(3)
        .mount(&mock_server)
        .await;
    mount_product(&mock_server, "B2", 1).await;

    let config = create_test_config(&mock_server.uri(), 1, 10);
    let report = scrape(config).await.expect("Scrape failed");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].title, "Phone B2");
    assert_eq!(report.stats.product_fetch_failures, 1);
}

#[tokio::test]
async fn test_no_products_is_not_an_error() {
    let mock_server = MockServer::start().await;

    mount_results(&mock_server, None, &[]).await;

    let config = create_test_config(&mock_server.uri(), 1, 10);
    let report = scrape(config).await.expect("Scrape failed");

    assert!(report.records.is_empty());
    assert_eq!(report.stats.pages_failed, 0);
    assert_eq!(report.stats.products_attempted, 0);
}
