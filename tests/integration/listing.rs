//! Integration tests for paginated listing

use crate::support::{detail_url, FakeTransport, BASE_URL};
use std::sync::Arc;
use vacancy_scraper::fetcher::{ApiConfig, FetcherError, ListingFetcher};
use vacancy_scraper::SearchQuery;

fn page_urls(page: usize) -> Vec<String> {
    (0..2).map(|i| detail_url(page * 100 + i)).collect()
}

fn listing_fetcher(transport: Arc<FakeTransport>) -> ListingFetcher {
    ListingFetcher::new(transport, &ApiConfig::new(BASE_URL))
}

#[tokio::test]
async fn test_listing_stops_at_max_pages() {
    let mut transport = FakeTransport::new();
    for page in 0..10 {
        transport = transport.with_listing_page(&page_urls(page), 10);
    }
    let transport = Arc::new(transport);

    let urls = listing_fetcher(transport.clone())
        .list_urls(&SearchQuery::new("Engineer", 3))
        .await
        .unwrap();

    assert_eq!(transport.listing_calls().len(), 3);
    let expected: Vec<String> = (0..3).flat_map(page_urls).collect();
    assert_eq!(urls, expected);
}

#[tokio::test]
async fn test_listing_stops_at_last_server_page() {
    let transport = Arc::new(
        FakeTransport::new()
            .with_listing_page(&page_urls(0), 2)
            .with_listing_page(&page_urls(1), 2),
    );

    let urls = listing_fetcher(transport.clone())
        .list_urls(&SearchQuery::new("Engineer", 5))
        .await
        .unwrap();

    // Page 1 of 2 is the last one; page 2 is never requested
    assert_eq!(transport.listing_calls().len(), 2);
    assert_eq!(urls.len(), 4);
}

#[tokio::test]
async fn test_listing_single_page_result() {
    let transport = Arc::new(FakeTransport::new().with_listing_page(&page_urls(0), 1));

    let urls = listing_fetcher(transport.clone())
        .list_urls(&SearchQuery::new("Engineer", 5))
        .await
        .unwrap();

    assert_eq!(transport.listing_calls().len(), 1);
    assert_eq!(urls, page_urls(0));
}

#[tokio::test]
async fn test_listing_empty_result() {
    let transport = Arc::new(FakeTransport::new().with_listing_page(&[], 0));

    let urls = listing_fetcher(transport.clone())
        .list_urls(&SearchQuery::new("Nobody", 5))
        .await
        .unwrap();

    assert!(urls.is_empty());
    assert_eq!(transport.listing_calls().len(), 1);
}

#[tokio::test]
async fn test_listing_request_parameters() {
    let transport = Arc::new(
        FakeTransport::new()
            .with_listing_page(&page_urls(0), 3)
            .with_listing_page(&page_urls(1), 3),
    );

    listing_fetcher(transport.clone())
        .list_urls(&SearchQuery::new("Engineer", 2).with_area(1001))
        .await
        .unwrap();

    let calls = transport.listing_calls();
    assert_eq!(calls.len(), 2);
    for (index, call) in calls.iter().enumerate() {
        assert_eq!(call.param("text"), Some("NAME:Engineer"));
        assert_eq!(call.param("area"), Some("1001"));
        assert_eq!(call.param("per_page"), Some("100"));
        assert_eq!(call.param("page"), Some(index.to_string().as_str()));
    }
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    // Page 1 is missing, so the fake answers 404
    let transport = Arc::new(FakeTransport::new().with_listing_page(&page_urls(0), 5));

    let err = listing_fetcher(transport.clone())
        .list_urls(&SearchQuery::new("Engineer", 5))
        .await
        .unwrap_err();

    assert!(matches!(err, FetcherError::HttpStatus { status: 404, .. }));
    assert_eq!(transport.listing_calls().len(), 2);
}
