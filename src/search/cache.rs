//! Query result cache.
//!
//! Memoizes complete search responses per cache key (the normalized query
//! plus the strategy set that produced it). Entries expire after a TTL; a hit
//! refreshes the entry's timestamp and bumps its hit counter. When the store is
//! full, the least valuable entry (lowest `hits + recency`) is evicted.
//!
//! Responses whose remote strategy failed are never stored, so a transient
//! outage does not pin degraded results for a whole TTL.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::search::types::SearchResponse;

/// Default cache size (number of distinct queries)
pub const DEFAULT_CAPACITY: usize = 100;

/// Default entry lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Cached response with metadata for eviction decisions.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub response: SearchResponse,
    /// Creation time, refreshed on every hit
    pub cached_at: Instant,
    pub hit_count: u64,
}

impl CacheEntry {
    fn is_stale(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.cached_at) > ttl
    }

    /// `hits + recency`, recency falling from 1.0 (just stored) to 0.0 (at TTL).
    fn value(&self, now: Instant, ttl: Duration) -> f64 {
        let age = now.saturating_duration_since(self.cached_at).as_secs_f64();
        let ttl = ttl.as_secs_f64();
        let recency = if ttl > 0.0 {
            (1.0 - age / ttl).max(0.0)
        } else {
            0.0
        };
        self.hit_count as f64 + recency
    }
}

/// Cache statistics for monitoring and tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped to make room
    pub evictions: u64,
    /// Entries dropped because their TTL passed
    pub expired: u64,
    /// `put` calls refused (degraded response or empty key)
    pub rejected: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Inner {
    entries: LruCache<String, CacheEntry>,
    stats: CacheStats,
}

pub struct QueryCache {
    inner: Mutex<Inner>,
    capacity: usize,
    ttl: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl QueryCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                stats: CacheStats::default(),
            }),
            capacity: capacity.get(),
            ttl,
        }
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &str) -> Option<SearchResponse> {
        self.get_at(key, Instant::now())
    }

    /// Lookup as of `now`. Stale entries are removed and count as misses.
    pub fn get_at(&self, key: &str, now: Instant) -> Option<SearchResponse> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let ttl = self.ttl;

        let stale = match inner.entries.get_mut(key) {
            Some(entry) if !entry.is_stale(now, ttl) => {
                entry.hit_count += 1;
                entry.cached_at = now;
                let response = entry.response.clone();
                inner.stats.hits += 1;
                trace!(target: "cache", key, "cache hit");
                return Some(response);
            }
            Some(_) => true,
            None => false,
        };

        if stale {
            inner.entries.pop(key);
            inner.stats.expired += 1;
            trace!(target: "cache", key, "cache entry expired");
        }
        inner.stats.misses += 1;
        None
    }

    /// Store a response. Returns `false` when the response was refused.
    pub fn put(&self, key: &str, response: SearchResponse) -> bool {
        self.put_at(key, response, Instant::now())
    }

    pub fn put_at(&self, key: &str, response: SearchResponse, now: Instant) -> bool {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if key.trim().is_empty() || response.is_degraded() {
            inner.stats.rejected += 1;
            debug!(target: "cache", key, degraded = response.is_degraded(), "refusing cache entry");
            return false;
        }

        let ttl = self.ttl;
        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_stale(now, ttl))
            .map(|(k, _)| k.clone())
            .collect();
        for stale in &expired {
            inner.entries.pop(stale);
        }
        inner.stats.expired += expired.len() as u64;

        if !inner.entries.contains(key) && inner.entries.len() >= self.capacity {
            let victim = inner
                .entries
                .iter()
                .min_by(|(_, a), (_, b)| a.value(now, ttl).total_cmp(&b.value(now, ttl)))
                .map(|(k, _)| k.clone());
            if let Some(victim) = victim {
                inner.entries.pop(&victim);
                inner.stats.evictions += 1;
                debug!(target: "cache", evicted = %victim, "cache full, evicted entry");
            }
        }

        inner.entries.put(
            key.to_string(),
            CacheEntry {
                response,
                cached_at: now,
                hit_count: 0,
            },
        );
        true
    }

    /// Hit count of an entry, fresh or not, without touching it.
    pub fn hit_count(&self, key: &str) -> Option<u64> {
        self.inner.lock().entries.peek(key).map(|entry| entry.hit_count)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats.clone()
    }

    /// Drop all entries and reset statistics.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.stats = CacheStats::default();
    }
}
