use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::models::{Interval, Period, PricePoint};

/// Cache key for one fetched series: the exact request that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub ticker: String,
    pub period: Period,
    pub interval: Interval,
}

impl SeriesKey {
    pub fn new(ticker: &str, period: Period, interval: Interval) -> Self {
        Self {
            ticker: ticker.to_uppercase(),
            period,
            interval,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    series: Vec<PricePoint>,
    fetched_at: DateTime<Utc>,
}

/// Thread-safe TTL cache for fetched price series.
///
/// Injected into the analytics services next to the provider; a fresh entry
/// short-circuits the fetch, and a stale entry may still be served when a
/// refetch fails. Holds no other state and performs no I/O itself.
#[derive(Clone)]
pub struct SeriesCache {
    ttl: Duration,
    entries: Arc<DashMap<SeriesKey, CacheEntry>>,
}

impl SeriesCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs as i64),
            entries: Arc::new(DashMap::new()),
        }
    }

    /// The cached series for `key`, only if it is still within its TTL.
    pub fn get_fresh(&self, key: &SeriesKey) -> Option<Vec<PricePoint>> {
        let entry = self.entries.get(key)?;
        if Utc::now() - entry.fetched_at < self.ttl {
            Some(entry.series.clone())
        } else {
            None
        }
    }

    /// The cached series for `key` regardless of age. Used as a last resort
    /// when the provider cannot be reached.
    pub fn get_any(&self, key: &SeriesKey) -> Option<Vec<PricePoint>> {
        self.entries.get(key).map(|e| e.series.clone())
    }

    pub fn insert(&self, key: SeriesKey, series: Vec<PricePoint>) {
        self.entries.insert(
            key,
            CacheEntry {
                series,
                fetched_at: Utc::now(),
            },
        );
    }

    /// Drop every entry past its TTL.
    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| now - entry.fetched_at < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
