//! Integration tests for rate limiting functionality

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use vacancy_scraper::batch::{RateLimiter, RequestGate, Unthrottled};

/// Acquire from `callers` concurrent tasks and return the grant times, sorted
async fn grant_times(gate: Arc<dyn RequestGate>, callers: usize) -> Vec<Instant> {
    let grants = Arc::new(Mutex::new(Vec::new()));
    let mut join_set = JoinSet::new();

    for _ in 0..callers {
        let gate = gate.clone();
        let grants = grants.clone();
        join_set.spawn(async move {
            gate.acquire().await.unwrap();
            grants.lock().unwrap().push(Instant::now());
        });
    }
    while let Some(result) = join_set.join_next().await {
        result.unwrap();
    }

    let mut grants = grants.lock().unwrap().clone();
    grants.sort();
    grants
}

#[tokio::test(start_paused = true)]
async fn test_fixed_interval_spaces_concurrent_callers() {
    let delay = Duration::from_millis(200);
    let grants = grant_times(Arc::new(RateLimiter::fixed_interval(delay)), 5).await;

    assert_eq!(grants.len(), 5);
    for pair in grants.windows(2) {
        assert!(
            pair[1] - pair[0] >= delay,
            "grants {:?} apart, expected at least {:?}",
            pair[1] - pair[0],
            delay
        );
    }
    assert!(grants[4] - grants[0] >= delay * 4);
}

#[tokio::test(start_paused = true)]
async fn test_first_acquire_is_immediate() {
    let limiter = RateLimiter::fixed_interval(Duration::from_secs(5));
    let start = Instant::now();

    limiter.acquire().await.unwrap();

    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_spacing_is_independent_of_request_duration() {
    let delay = Duration::from_millis(100);
    let limiter = RateLimiter::fixed_interval(delay);
    let start = Instant::now();

    // A request slower than the delay leaves the next start unblocked
    limiter.acquire().await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    limiter.acquire().await.unwrap();

    assert_eq!(start.elapsed(), Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn test_zero_delay_never_waits() {
    let grants = grant_times(Arc::new(RateLimiter::fixed_interval(Duration::ZERO)), 10).await;
    assert_eq!(grants.first(), grants.last());
}

#[tokio::test(start_paused = true)]
async fn test_request_based_allows_burst_per_window() {
    let window = Duration::from_secs(1);
    let grants = grant_times(Arc::new(RateLimiter::request_based(3, window)), 6).await;

    assert_eq!(grants[2] - grants[0], Duration::ZERO);
    assert!(grants[3] - grants[0] >= window);
}

#[tokio::test(start_paused = true)]
async fn test_unthrottled_gate() {
    let grants = grant_times(Arc::new(Unthrottled), 5).await;
    assert_eq!(grants.first(), grants.last());
}
