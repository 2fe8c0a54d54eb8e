//! Integration tests for the per-level wind dataset cache.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Notify;

use overlay_common::{DateKey, LevelKey, OverlayError, OverlayResult};
use storage::{
    DatasetFetcher, FsDatasetFetcher, HttpDatasetFetcher, RefreshOutcome, WindDatasetCache,
};
use test_utils::{error_payload, next_date, sample_date, wind_payload, DatasetTree};

fn fs_cache(tree: &DatasetTree) -> WindDatasetCache {
    WindDatasetCache::new(Arc::new(FsDatasetFetcher::new(tree.root())))
}

// ============================================================================
// Local directory fetcher
// ============================================================================

#[tokio::test]
async fn test_loads_dataset_from_directory() {
    let tree = DatasetTree::new();
    tree.write_wind(
        sample_date(),
        LevelKey::Surface10m,
        &wind_payload(LevelKey::Surface10m, &[(-33.0, -70.0, 5.0, 5.0)], 30.0),
    );
    let cache = fs_cache(&tree);

    let entry = cache.get(sample_date(), LevelKey::Surface10m).await.unwrap();
    assert_eq!(entry.date, sample_date());
    assert_eq!(entry.field.len(), 1);
    assert_eq!(entry.field.delta_minutes, Some(30.0));
    assert_eq!(entry.meta.source.as_deref(), Some("GFS 0.25"));
    assert_eq!(entry.meta.forecast_hour, Some(12));
}

#[tokio::test]
async fn test_missing_file_clears_entry() {
    let tree = DatasetTree::new();
    tree.write_wind(
        sample_date(),
        LevelKey::Hpa150,
        &wind_payload(LevelKey::Hpa150, &[(-30.0, -70.0, 20.0, 0.0)], 10.0),
    );
    let cache = fs_cache(&tree);

    cache.get(sample_date(), LevelKey::Hpa150).await.unwrap();
    assert!(cache.current(LevelKey::Hpa150).await.is_some());

    let err = cache.get(next_date(), LevelKey::Hpa150).await.unwrap_err();
    match &err {
        OverlayError::MissingDataset { level, date, .. } => {
            assert_eq!(level, "150hPa");
            assert_eq!(date, "2025-03-15");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(err.is_recoverable());
    assert!(cache.current(LevelKey::Hpa150).await.is_none());
    assert_eq!(cache.stats().failures(), 1);
}

#[tokio::test]
async fn test_malformed_file_is_missing_dataset() {
    let tree = DatasetTree::new();
    tree.write_raw("data/wind/2025-03-14/900hPa.json", b"{ not json");
    let cache = fs_cache(&tree);

    let err = cache.get(sample_date(), LevelKey::Hpa900).await.unwrap_err();
    assert!(matches!(err, OverlayError::MissingDataset { .. }));
}

#[tokio::test]
async fn test_error_payload_is_cached_as_empty_field() {
    let tree = DatasetTree::new();
    tree.write_wind(
        sample_date(),
        LevelKey::Hpa400,
        &error_payload(LevelKey::Hpa400, "GFS run not published"),
    );
    let cache = fs_cache(&tree);

    let entry = cache.get(sample_date(), LevelKey::Hpa400).await.unwrap();
    assert!(entry.field.is_empty());
    assert_eq!(entry.meta.error.as_deref(), Some("GFS run not published"));
}

#[tokio::test]
async fn test_date_switch_replaces_entry() {
    let tree = DatasetTree::new();
    for (date, u) in [(sample_date(), 1.0), (next_date(), 2.0)] {
        tree.write_wind(
            date,
            LevelKey::Surface10m,
            &wind_payload(LevelKey::Surface10m, &[(-33.0, -70.0, u, 0.0)], 0.0),
        );
    }
    let cache = fs_cache(&tree);

    cache.get(sample_date(), LevelKey::Surface10m).await.unwrap();
    cache.get(next_date(), LevelKey::Surface10m).await.unwrap();

    let current = cache.current(LevelKey::Surface10m).await.unwrap();
    assert_eq!(current.date, next_date());
    assert_eq!(current.field.samples[0].u, 2.0);
}

// ============================================================================
// Lazy activation
// ============================================================================

#[tokio::test]
async fn test_refresh_inactive_level_is_noop() {
    let tree = DatasetTree::new();
    let cache = fs_cache(&tree);

    // No file exists; an inactive refresh must not even try.
    let outcome = cache.refresh(sample_date(), LevelKey::Hpa900).await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::Inactive));
    assert_eq!(cache.stats().misses(), 0);
    assert_eq!(cache.generation(LevelKey::Hpa900).await, 0);
}

#[tokio::test]
async fn test_activate_then_refresh_fetches() {
    let tree = DatasetTree::new();
    tree.write_wind(
        sample_date(),
        LevelKey::Hpa900,
        &wind_payload(LevelKey::Hpa900, &[(-33.0, -70.0, 5.0, 5.0)], 0.0),
    );
    let cache = fs_cache(&tree);

    cache.activate(LevelKey::Hpa900).await;
    let outcome = cache.refresh(sample_date(), LevelKey::Hpa900).await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::Ready(ref e) if e.field.len() == 1));
    assert_eq!(cache.active_levels().await, vec![LevelKey::Hpa900]);

    cache.deactivate(LevelKey::Hpa900).await;
    assert!(!cache.is_active(LevelKey::Hpa900).await);
    assert!(cache.current(LevelKey::Hpa900).await.is_none());
}

// ============================================================================
// Generation tokens
// ============================================================================

/// Holds one request (by call order) until released; others answer at once.
struct GatedFetcher {
    calls: AtomicUsize,
    held_call: usize,
    first_started: Notify,
    release_first: Notify,
}

impl GatedFetcher {
    fn holding(held_call: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            held_call,
            first_started: Notify::new(),
            release_first: Notify::new(),
        }
    }
}

#[async_trait]
impl DatasetFetcher for GatedFetcher {
    async fn fetch(&self, relative_path: &str) -> OverlayResult<Bytes> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == self.held_call {
            self.first_started.notify_one();
            self.release_first.notified().await;
        }
        let u = if relative_path.contains("2025-03-14") { 1.0 } else { 2.0 };
        let body = wind_payload(LevelKey::Surface10m, &[(-33.0, -70.0, u, 0.0)], 0.0);
        Ok(Bytes::from(serde_json::to_vec(&body)?))
    }

    fn describe(&self) -> String {
        "gated".to_string()
    }
}

#[tokio::test]
async fn test_stale_response_does_not_overwrite_newer() {
    let fetcher = Arc::new(GatedFetcher::holding(0));
    let cache = Arc::new(WindDatasetCache::new(fetcher.clone()));

    // Token 1: older date, held in flight.
    let slow = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.get(sample_date(), LevelKey::Surface10m).await })
    };
    fetcher.first_started.notified().await;

    // Token 2: newer date, completes first.
    let fresh = cache.get(next_date(), LevelKey::Surface10m).await.unwrap();
    assert_eq!(fresh.generation, 2);

    fetcher.release_first.notify_one();
    let stale = slow.await.unwrap().unwrap_err();
    match stale {
        OverlayError::StaleResponse { token, latest, .. } => {
            assert_eq!(token, 1);
            assert_eq!(latest, 2);
        }
        other => panic!("unexpected error {:?}", other),
    }

    let current = cache.current(LevelKey::Surface10m).await.unwrap();
    assert_eq!(current.date, next_date());
    assert_eq!(current.generation, 2);
    assert_eq!(current.field.samples[0].u, 2.0);
    assert_eq!(cache.stats().stale_discarded(), 1);
}

#[tokio::test]
async fn test_hit_supersedes_in_flight_fetch() {
    let fetcher = Arc::new(GatedFetcher::holding(1));
    let cache = Arc::new(WindDatasetCache::new(fetcher.clone()));

    // First date cached under token 1.
    cache.get(sample_date(), LevelKey::Surface10m).await.unwrap();

    // Second date held in flight under token 2.
    let slow = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.get(next_date(), LevelKey::Surface10m).await })
    };
    fetcher.first_started.notified().await;

    // Back to the first date: served from the entry, token 3.
    let back = cache.get(sample_date(), LevelKey::Surface10m).await.unwrap();
    assert_eq!(back.date, sample_date());
    assert_eq!(cache.generation(LevelKey::Surface10m).await, 3);

    fetcher.release_first.notify_one();
    match slow.await.unwrap().unwrap_err() {
        OverlayError::StaleResponse { token, latest, .. } => {
            assert_eq!(token, 2);
            assert_eq!(latest, 3);
        }
        other => panic!("unexpected error {:?}", other),
    }

    let current = cache.current(LevelKey::Surface10m).await.unwrap();
    assert_eq!(current.date, sample_date());
    assert_eq!(current.field.samples[0].u, 1.0);
    assert_eq!(cache.stats().hits(), 1);
    assert_eq!(cache.stats().misses(), 2);
    assert_eq!(cache.stats().stale_discarded(), 1);
}

#[tokio::test]
async fn test_invalidate_discards_in_flight_response() {
    let fetcher = Arc::new(GatedFetcher::holding(0));
    let cache = Arc::new(WindDatasetCache::new(fetcher.clone()));

    let pending = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.get(sample_date(), LevelKey::Surface10m).await })
    };
    fetcher.first_started.notified().await;
    cache.invalidate(LevelKey::Surface10m).await;
    fetcher.release_first.notify_one();

    assert!(pending.await.unwrap().unwrap_err().is_stale());
    assert!(cache.current(LevelKey::Surface10m).await.is_none());
}

// ============================================================================
// HTTP fetcher
// ============================================================================

/// Serve one canned HTTP response per connection.
async fn serve(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{}/viewer/", addr)
}

#[tokio::test]
async fn test_http_404_is_missing_dataset() {
    let base = serve("HTTP/1.1 404 Not Found", "").await;
    let cache = WindDatasetCache::new(Arc::new(HttpDatasetFetcher::new(&base).unwrap()));

    let err = cache.get(sample_date(), LevelKey::Hpa400).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("400hPa"), "{}", message);
    assert!(message.contains("2025-03-14"), "{}", message);
    assert!(message.contains("404"), "{}", message);
}

#[tokio::test]
async fn test_http_success() {
    let base = serve(
        "HTTP/1.1 200 OK",
        r#"{"points":[{"lat":-33,"lon":-70,"u":5,"v":5}],"meta":{"level_key":"10m","delta_minutes":30}}"#,
    )
    .await;
    let fetcher = HttpDatasetFetcher::new(&base).unwrap();
    let bytes = fetcher.fetch("data/wind/2025-03-14/10m.json").await.unwrap();
    assert!(!bytes.is_empty());

    let cache = WindDatasetCache::new(Arc::new(fetcher));
    let entry = cache.get(DateKey::today_utc(), LevelKey::Surface10m).await.unwrap();
    assert_eq!(entry.field.len(), 1);
}
