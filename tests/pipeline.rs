//! Collector -> CacheFeeder -> CacheStore wiring with a stubbed upstream.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crisp::cache::CacheStore;
use crisp::collector::{Collector, CollectorState, Fetch};
use crisp::error::{AppError, AppResult};
use crisp::feeder::CacheFeeder;

#[derive(Clone, Default)]
struct CountingFetcher {
    calls: Arc<AtomicUsize>,
    fail_on: Vec<usize>,
}

impl Fetch for CountingFetcher {
    fn target(&self) -> &str {
        "http://upstream.test/resource.json"
    }

    async fn fetch(&self) -> AppResult<Vec<u8>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on.contains(&n) {
            return Err(AppError::Io(std::io::Error::other("connection reset")));
        }
        Ok(format!("{{\"n\":{}}}", n).into_bytes())
    }
}

/// Runs the pipeline for `run_for`, stops the collector and returns how many items were fed.
async fn run_pipeline(
    fetcher: CountingFetcher,
    period: Duration,
    run_for: Duration,
    store: Arc<CacheStore>,
) -> u64 {
    let (collector, rx) = Collector::new(fetcher, period).spawn();
    let feeder = tokio::spawn(CacheFeeder::new(store).run(rx));

    tokio::time::sleep(run_for).await;
    assert_eq!(collector.stop().await, CollectorState::Stopped);

    feeder.await.unwrap().unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_feeds_three_to_four_items_in_350ms() {
    let fetcher = CountingFetcher::default();
    let calls = fetcher.calls.clone();
    let store = Arc::new(CacheStore::default());

    let fed = run_pipeline(
        fetcher,
        Duration::from_millis(100),
        Duration::from_millis(350),
        store.clone(),
    )
    .await;

    assert!((3..=4).contains(&fed), "fed {} items", fed);
    let latest = store.get().await.unwrap();
    let expected = format!("{{\"n\":{}}}", calls.load(Ordering::SeqCst));
    assert_eq!(latest.payload, expected.as_bytes());
}

#[tokio::test(start_paused = true)]
async fn test_transient_failure_does_not_stop_polling() {
    let fetcher = CountingFetcher {
        fail_on: vec![2],
        ..Default::default()
    };
    let calls = fetcher.calls.clone();
    let store = Arc::new(CacheStore::default());

    let fed = run_pipeline(
        fetcher,
        Duration::from_millis(100),
        Duration::from_millis(250),
        store.clone(),
    )
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(fed, 2);
    assert_eq!(store.get().await.unwrap().payload, b"{\"n\":3}");
}

#[tokio::test(start_paused = true)]
async fn test_ring_keeps_only_capacity_items() {
    let store = Arc::new(CacheStore::new(3));

    let fed = run_pipeline(
        CountingFetcher::default(),
        Duration::from_millis(10),
        Duration::from_millis(95),
        store.clone(),
    )
    .await;

    assert!(fed > 3);
    assert_eq!(store.len().await, 3);
    let latest = store.get().await.unwrap();
    assert_eq!(latest.payload, format!("{{\"n\":{}}}", fed).as_bytes());
}
