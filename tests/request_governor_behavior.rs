//! Behavior-driven tests for the request governor.
//!
//! These tests verify HOW repeated and rapid requests are absorbed: what is
//! served from the DuckDB cache, what reaches the provider, and when callers
//! have to wait for the rate limiter.

mod support;

use std::sync::Arc;
use std::time::{Duration, Instant};

use support::{rows, ScriptedClient};
use tickview_core::{
    AdmissionLimiter, CacheMode, HistoryCache, HistoryRequest, LookbackWindow, MarketDataClient,
    RequestGovernor, SourceError, SourceErrorKind, Ticker, TimeRange,
};

fn request(ticker: &str) -> HistoryRequest {
    HistoryRequest::new(
        Ticker::parse(ticker).expect("ticker"),
        TimeRange::period(LookbackWindow::Months(3)),
    )
}

fn open_cache(dir: &tempfile::TempDir, ttl: Option<Duration>) -> HistoryCache {
    HistoryCache::open(dir.path().join("cache").join("history.duckdb"), ttl).expect("cache")
}

fn generous_limiter() -> AdmissionLimiter {
    AdmissionLimiter::new(Duration::from_secs(1), 100)
}

// =============================================================================
// Cache hits
// =============================================================================

#[tokio::test]
async fn when_request_repeats_cache_answers_without_provider_or_limiter() {
    // Given: A governor with an empty cache
    let dir = tempfile::tempdir().expect("tempdir");
    let client = ScriptedClient::always(rows(5));
    let governor = RequestGovernor::new(
        client.clone(),
        generous_limiter(),
        Some(open_cache(&dir, None)),
        CacheMode::Use,
    );

    // When: The same request is made twice
    let first = governor.history(request("TSLA")).await.expect("first");
    let second = governor.history(request("TSLA")).await.expect("second");

    // Then: Only the first reaches the provider or takes a limiter slot
    assert_eq!(first, second);
    assert_eq!(client.calls(), 1);
    assert_eq!(governor.limiter().admitted(), 1);
}

#[tokio::test]
async fn cache_keys_distinguish_ticker_and_range() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = ScriptedClient::always(rows(3));
    let governor = RequestGovernor::new(
        client.clone(),
        generous_limiter(),
        Some(open_cache(&dir, None)),
        CacheMode::Use,
    );

    governor.history(request("TSLA")).await.expect("tsla");
    governor.history(request("AAPL")).await.expect("aapl");
    governor
        .history(HistoryRequest::new(
            Ticker::parse("TSLA").expect("ticker"),
            TimeRange::period(LookbackWindow::Years(1)),
        ))
        .await
        .expect("tsla 1y");

    assert_eq!(client.calls(), 3);
    assert_eq!(governor.cache().expect("cache").len().expect("len"), 3);
}

#[tokio::test]
async fn without_ttl_a_restart_fetches_again() {
    // Given: A previous process cached NVDA without a TTL
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let governor = RequestGovernor::new(
            ScriptedClient::always(rows(4)),
            generous_limiter(),
            Some(open_cache(&dir, None)),
            CacheMode::Use,
        );
        governor.history(request("NVDA")).await.expect("warm");
    }

    // When: A new process opens the same file and asks again
    let client = ScriptedClient::always(rows(9));
    let governor = RequestGovernor::new(
        client.clone(),
        generous_limiter(),
        Some(open_cache(&dir, None)),
        CacheMode::Use,
    );
    let table = governor.history(request("NVDA")).await.expect("refetched");

    // Then: The provider answers, and its answer replaces the old entry
    assert_eq!(table.len(), 9);
    assert_eq!(client.calls(), 1);
    assert_eq!(governor.cache().expect("cache").len().expect("len"), 1);
}

#[tokio::test]
async fn with_ttl_fresh_entries_survive_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ttl = Some(Duration::from_secs(3_600));
    {
        let governor = RequestGovernor::new(
            ScriptedClient::always(rows(4)),
            generous_limiter(),
            Some(open_cache(&dir, ttl)),
            CacheMode::Use,
        );
        governor.history(request("NVDA")).await.expect("warm");
    }

    let client = ScriptedClient::always(rows(9));
    let governor = RequestGovernor::new(
        client.clone(),
        generous_limiter(),
        Some(open_cache(&dir, ttl)),
        CacheMode::Use,
    );
    let table = governor.history(request("NVDA")).await.expect("cached");

    assert_eq!(table.len(), 4);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn expired_entries_are_fetched_again() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = ScriptedClient::always(rows(3));
    let cache = open_cache(&dir, Some(Duration::from_millis(5)));
    let governor =
        RequestGovernor::new(client.clone(), generous_limiter(), Some(cache.clone()), CacheMode::Use);

    governor.history(request("AMD")).await.expect("first");
    tokio::time::sleep(Duration::from_millis(30)).await;
    governor.history(request("AMD")).await.expect("second");

    assert_eq!(client.calls(), 2);
    assert_eq!(cache.len().expect("len"), 1);
}

#[test]
fn clear_expired_only_removes_stale_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let table = tickview_core::RawSeries::new(
        Ticker::parse("AMD").expect("ticker"),
        "USD",
        rows(2),
    );

    let forever = open_cache(&dir, None);
    forever.put(&request("AMD"), &table).expect("put");
    assert_eq!(forever.clear_expired().expect("clear"), 0);
    drop(forever);

    let short = open_cache(&dir, Some(Duration::from_millis(1)));
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(short.clear_expired().expect("clear"), 1);
    assert!(short.is_empty().expect("empty"));
}

// =============================================================================
// Cache modes
// =============================================================================

#[tokio::test]
async fn refresh_mode_always_fetches_but_updates_the_cache() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = open_cache(&dir, None);
    let client = ScriptedClient::new(vec![Ok(rows(2)), Ok(rows(6))]);
    let governor = RequestGovernor::new(
        client.clone(),
        generous_limiter(),
        Some(cache.clone()),
        CacheMode::Refresh,
    );

    governor.history(request("TSLA")).await.expect("first");
    governor.history(request("TSLA")).await.expect("second");
    assert_eq!(client.calls(), 2);

    let stored = cache.get(&request("TSLA")).expect("get").expect("entry");
    assert_eq!(stored.len(), 6);
}

#[tokio::test]
async fn bypass_mode_neither_reads_nor_writes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = open_cache(&dir, None);
    let client = ScriptedClient::always(rows(3));
    let governor = RequestGovernor::new(
        client.clone(),
        generous_limiter(),
        Some(cache.clone()),
        CacheMode::Bypass,
    );

    governor.history(request("TSLA")).await.expect("first");
    governor.history(request("TSLA")).await.expect("second");

    assert_eq!(client.calls(), 2);
    assert!(cache.is_empty().expect("empty"));
}

// =============================================================================
// What is never cached
// =============================================================================

#[tokio::test]
async fn empty_answers_are_not_cached() {
    // Given: The provider has nothing for the period request
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = open_cache(&dir, None);
    let client = ScriptedClient::new(vec![Ok(Vec::new()), Ok(rows(3))]);
    let governor =
        RequestGovernor::new(client.clone(), generous_limiter(), Some(cache.clone()), CacheMode::Use);

    // When: The request is repeated
    let first = governor.history(request("ZZZZ")).await.expect("first");
    let second = governor.history(request("ZZZZ")).await.expect("second");

    // Then: The second call still reached the provider
    assert!(first.is_empty());
    assert_eq!(second.len(), 3);
    assert_eq!(client.calls(), 2);
    assert_eq!(cache.len().expect("len"), 1);
}

#[tokio::test]
async fn provider_errors_propagate_and_are_not_cached() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = open_cache(&dir, None);
    let client = ScriptedClient::new(vec![Err(SourceError::rate_limited("slow down"))]);
    let governor =
        RequestGovernor::new(client.clone(), generous_limiter(), Some(cache.clone()), CacheMode::Use);

    let error = governor.history(request("TSLA")).await.expect_err("error");
    assert_eq!(error.kind(), SourceErrorKind::RateLimited);
    assert!(cache.is_empty().expect("empty"));
}

// =============================================================================
// Rate limiting
// =============================================================================

#[tokio::test]
async fn rapid_misses_wait_for_the_limiter() {
    // Given: One call per 300ms and no cache
    let client = ScriptedClient::always(rows(2));
    let governor = RequestGovernor::new(
        client.clone(),
        AdmissionLimiter::new(Duration::from_millis(300), 1),
        None,
        CacheMode::Use,
    );

    // When: Two different tickers are requested back to back
    let started = Instant::now();
    governor.history(request("AAA")).await.expect("first");
    governor.history(request("BBB")).await.expect("second");

    // Then: The second call was delayed, not rejected
    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(client.calls(), 2);
    assert_eq!(governor.limiter().admitted(), 2);
}

#[tokio::test]
async fn concurrent_sessions_share_one_budget() {
    let client = ScriptedClient::always(rows(2));
    let governor = Arc::new(RequestGovernor::new(
        client.clone(),
        AdmissionLimiter::new(Duration::from_millis(300), 2),
        None,
        CacheMode::Bypass,
    ));

    let started = Instant::now();
    let tasks: Vec<_> = ["AAA", "BBB", "CCC"]
        .into_iter()
        .map(|ticker| {
            let governor = governor.clone();
            tokio::spawn(async move { governor.history(request(ticker)).await })
        })
        .collect();
    for task in tasks {
        task.await.expect("join").expect("history");
    }

    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(client.calls(), 3);
}
