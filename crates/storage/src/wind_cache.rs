//! Per-level wind dataset cache.
//!
//! Holds at most one dataset per level (switching date replaces the entry).
//! Every fetch takes a generation token for its level; a response whose token
//! is no longer the newest for that level is dropped without touching the
//! entry, so a slow request for an old date can never overwrite a newer one.
//!
//! Entries are `Arc`s swapped under a short write lock and the lock is never
//! held across a fetch, so readers see either the old field or the new one.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use overlay_common::{DateKey, LevelKey, OverlayError, OverlayResult, WindField};

use crate::dataset::{decode_payload, DatasetAddress, DatasetMeta};
use crate::fetcher::DatasetFetcher;

/// A cached dataset for one level.
#[derive(Debug, Clone)]
pub struct CachedDataset {
    pub date: DateKey,
    pub field: Arc<WindField>,
    pub meta: Arc<DatasetMeta>,
    /// Generation token the dataset was fetched under.
    pub generation: u64,
}

/// Result of a lazy refresh.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// The level is not displayed; nothing was fetched.
    Inactive,
    Ready(CachedDataset),
}

/// Statistics for the wind dataset cache.
#[derive(Debug, Default)]
pub struct WindCacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    /// Responses dropped because a newer request was issued.
    pub stale_discarded: AtomicU64,
    pub failures: AtomicU64,
}

impl WindCacheStats {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn stale_discarded(&self) -> u64 {
        self.stale_discarded.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
struct LevelSlot {
    /// Newest token issued for this level.
    generation: u64,
    entry: Option<CachedDataset>,
}

/// Per-level cache of wind fields.
pub struct WindDatasetCache {
    fetcher: Arc<dyn DatasetFetcher>,
    slots: RwLock<HashMap<LevelKey, LevelSlot>>,
    active: RwLock<HashSet<LevelKey>>,
    stats: WindCacheStats,
}

impl WindDatasetCache {
    pub fn new(fetcher: Arc<dyn DatasetFetcher>) -> Self {
        Self {
            fetcher,
            slots: RwLock::new(HashMap::new()),
            active: RwLock::new(HashSet::new()),
            stats: WindCacheStats::default(),
        }
    }

    pub fn stats(&self) -> &WindCacheStats {
        &self.stats
    }

    /// Mark a level as displayed so refreshes fetch it.
    pub async fn activate(&self, level: LevelKey) {
        self.active.write().await.insert(level);
        debug!(level = %level, "Level activated");
    }

    /// Stop displaying a level and drop its entry.
    pub async fn deactivate(&self, level: LevelKey) {
        self.active.write().await.remove(&level);
        self.invalidate(level).await;
        debug!(level = %level, "Level deactivated");
    }

    pub async fn is_active(&self, level: LevelKey) -> bool {
        self.active.read().await.contains(&level)
    }

    /// Active levels in display order.
    pub async fn active_levels(&self) -> Vec<LevelKey> {
        let active = self.active.read().await;
        LevelKey::ALL
            .iter()
            .copied()
            .filter(|level| active.contains(level))
            .collect()
    }

    /// Drop the entry for `level` and supersede any request in flight for it.
    pub async fn invalidate(&self, level: LevelKey) {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(level).or_default();
        slot.generation += 1;
        slot.entry = None;
        debug!(level = %level, generation = slot.generation, "Level invalidated");
    }

    /// Current entry for a level, whatever its date.
    pub async fn current(&self, level: LevelKey) -> Option<CachedDataset> {
        self.slots
            .read()
            .await
            .get(&level)
            .and_then(|slot| slot.entry.clone())
    }

    /// Newest generation token issued for a level.
    pub async fn generation(&self, level: LevelKey) -> u64 {
        self.slots
            .read()
            .await
            .get(&level)
            .map(|slot| slot.generation)
            .unwrap_or(0)
    }

    /// Fetch only when the level is active.
    pub async fn refresh(&self, date: DateKey, level: LevelKey) -> OverlayResult<RefreshOutcome> {
        if !self.is_active(level).await {
            debug!(level = %level, date = %date, "Refresh skipped, level inactive");
            return Ok(RefreshOutcome::Inactive);
        }
        self.get(date, level).await.map(RefreshOutcome::Ready)
    }

    /// Serve `(date, level)` from the cache without fetching.
    ///
    /// A hit is a new request for the level: it supersedes any fetch still in
    /// flight, so an older response cannot replace the entry afterwards.
    pub async fn lookup(&self, date: DateKey, level: LevelKey) -> Option<CachedDataset> {
        let mut slots = self.slots.write().await;
        let slot = slots.get_mut(&level)?;
        let entry = slot.entry.as_ref().filter(|e| e.date == date)?.clone();
        slot.generation += 1;
        self.stats.hits.fetch_add(1, Ordering::Relaxed);
        debug!(level = %level, date = %date, generation = slot.generation, "Cache hit");
        Some(entry)
    }

    /// Serve the dataset for `(date, level)`, fetching it on a miss.
    ///
    /// Hits and misses both take a new generation token for the level.
    ///
    /// Errors:
    /// - `MissingDataset` when the fetch or decode failed; the entry is cleared
    /// - `StaleResponse` when a newer request for the level was issued meanwhile
    #[instrument(skip(self), fields(level = %level, date = %date))]
    pub async fn get(&self, date: DateKey, level: LevelKey) -> OverlayResult<CachedDataset> {
        let token = {
            let mut slots = self.slots.write().await;
            let slot = slots.entry(level).or_default();
            slot.generation += 1;
            if let Some(entry) = slot.entry.as_ref().filter(|e| e.date == date) {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                debug!(generation = slot.generation, "Cache hit");
                return Ok(entry.clone());
            }
            slot.generation
        };
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        debug!(generation = token, "Cache miss, fetching");

        let address = DatasetAddress::new(date, level);
        let result = self
            .fetcher
            .fetch(&address.relative_path())
            .await
            .and_then(|bytes| decode_payload(&bytes, address));

        let mut slots = self.slots.write().await;
        let slot = slots.entry(level).or_default();
        if slot.generation != token {
            self.stats.stale_discarded.fetch_add(1, Ordering::Relaxed);
            debug!(
                generation = token,
                latest = slot.generation,
                "Discarding stale response"
            );
            return Err(OverlayError::StaleResponse {
                level: level.to_string(),
                token,
                latest: slot.generation,
            });
        }

        match result {
            Ok(decoded) => {
                let entry = CachedDataset {
                    date,
                    field: Arc::new(decoded.field),
                    meta: Arc::new(decoded.meta),
                    generation: token,
                };
                info!(
                    samples = entry.field.len(),
                    delta_minutes = ?entry.field.delta_minutes,
                    "Wind dataset loaded"
                );
                slot.entry = Some(entry.clone());
                Ok(entry)
            }
            Err(e) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                slot.entry = None;
                warn!(error = %e, source = %self.fetcher.describe(), "Wind dataset unavailable");
                Err(OverlayError::MissingDataset {
                    level: level.to_string(),
                    date: date.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::AtomicUsize;

    struct CountingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DatasetFetcher for CountingFetcher {
        async fn fetch(&self, _relative_path: &str) -> OverlayResult<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::from_static(br#"{"points":[{"lat":0,"lon":0,"u":1,"v":0}]}"#))
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    #[tokio::test]
    async fn test_hit_does_not_refetch() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
        });
        let cache = WindDatasetCache::new(fetcher.clone());
        let date: DateKey = "2024-07-01".parse().unwrap();

        cache.get(date, LevelKey::Surface10m).await.unwrap();
        cache.get(date, LevelKey::Surface10m).await.unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().hits(), 1);
        assert_eq!(cache.stats().misses(), 1);
        assert_eq!(cache.generation(LevelKey::Surface10m).await, 2);
    }

    #[tokio::test]
    async fn test_lookup_never_fetches() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
        });
        let cache = WindDatasetCache::new(fetcher.clone());
        let date: DateKey = "2024-07-01".parse().unwrap();
        let other: DateKey = "2024-07-02".parse().unwrap();

        assert!(cache.lookup(date, LevelKey::Hpa150).await.is_none());
        cache.get(date, LevelKey::Hpa150).await.unwrap();
        assert!(cache.lookup(other, LevelKey::Hpa150).await.is_none());
        assert_eq!(cache.generation(LevelKey::Hpa150).await, 1);

        let hit = cache.lookup(date, LevelKey::Hpa150).await.unwrap();
        assert_eq!(hit.date, date);
        assert_eq!(cache.generation(LevelKey::Hpa150).await, 2);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().hits(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_bumps_generation() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
        });
        let cache = WindDatasetCache::new(fetcher);
        let date: DateKey = "2024-07-01".parse().unwrap();

        let entry = cache.get(date, LevelKey::Hpa900).await.unwrap();
        assert_eq!(entry.generation, 1);
        cache.invalidate(LevelKey::Hpa900).await;
        assert_eq!(cache.generation(LevelKey::Hpa900).await, 2);
        assert!(cache.current(LevelKey::Hpa900).await.is_none());
    }
}
