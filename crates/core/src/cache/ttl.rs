//! Bounded in-memory cache with time-to-live expiry.
//!
//! Entries expire lazily: an expired key is evicted when it is read, or when
//! a `put` finds the cache full. Nothing sweeps on a timer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::clock::{Clock, SystemClock};
use crate::config::AppConfig;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default capacity.
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Slots freed below capacity by an oldest-first eviction.
pub const DEFAULT_EVICTION_HEADROOM: usize = 10;

/// A cached value and the time it was stored.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at_millis: i64,
    seq: u64,
}

/// Snapshot of cache occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total: usize,
    pub valid: usize,
    pub expired: usize,
}

#[derive(Debug)]
struct Inner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    next_seq: u64,
}

/// String-keyed cache with TTL and bounded size.
///
/// All map access happens under one async mutex, so concurrent `put`s
/// cannot both see spare capacity and overfill the map.
pub struct TtlCache<V> {
    inner: Mutex<Inner<V>>,
    ttl_millis: i64,
    max_entries: usize,
    headroom: usize,
    clock: Arc<dyn Clock>,
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl_millis", &self.ttl_millis)
            .field("max_entries", &self.max_entries)
            .field("headroom", &self.headroom)
            .finish_non_exhaustive()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache backed by the system clock.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self::with_clock(ttl, max_entries, Arc::new(SystemClock))
    }

    /// Create a cache reading time from `clock`.
    pub fn with_clock(ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner { entries: HashMap::new(), next_seq: 0 }),
            ttl_millis: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            max_entries,
            headroom: DEFAULT_EVICTION_HEADROOM,
            clock,
        }
    }

    /// Create a cache sized and timed from configuration.
    pub fn from_config(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_clock(config.cache_ttl(), config.cache_max_entries, clock)
            .with_headroom(config.cache_eviction_headroom)
    }

    pub fn with_headroom(mut self, headroom: usize) -> Self {
        self.headroom = headroom;
        self
    }

    fn is_expired(&self, entry: &CacheEntry<V>, now: i64) -> bool {
        now.saturating_sub(entry.stored_at_millis) > self.ttl_millis
    }

    /// Return the value for `key` if present and not expired.
    ///
    /// An expired entry is removed as a side effect.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock().await;
        let now = self.clock.now_millis();

        let expired = match inner.entries.get(key) {
            None => return None,
            Some(entry) => self.is_expired(entry, now),
        };

        if expired {
            inner.entries.remove(key);
            tracing::debug!(key, "cache entry expired on read");
            return None;
        }

        inner.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Store `value` under `key`. The empty key is never stored, and a
    /// zero-capacity cache stores nothing.
    pub async fn put(&self, key: &str, value: V) {
        if key.is_empty() || self.max_entries == 0 {
            return;
        }

        let mut inner = self.inner.lock().await;
        let now = self.clock.now_millis();

        if !inner.entries.contains_key(key) && inner.entries.len() >= self.max_entries {
            self.make_room(&mut inner, now);
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner
            .entries
            .insert(key.to_string(), CacheEntry { value, stored_at_millis: now, seq });
    }

    /// Drop expired entries, then the oldest ones if the cache is still full.
    fn make_room(&self, inner: &mut Inner<V>, now: i64) {
        let before = inner.entries.len();
        inner
            .entries
            .retain(|_, entry| now.saturating_sub(entry.stored_at_millis) <= self.ttl_millis);
        let expired = before - inner.entries.len();

        let mut evicted = 0;
        if inner.entries.len() >= self.max_entries {
            let target = self.max_entries.saturating_sub(self.headroom);
            let mut by_age: Vec<(i64, u64, String)> = inner
                .entries
                .iter()
                .map(|(key, entry)| (entry.stored_at_millis, entry.seq, key.clone()))
                .collect();
            by_age.sort_unstable();

            for (_, _, key) in by_age {
                if inner.entries.len() <= target {
                    break;
                }
                inner.entries.remove(&key);
                evicted += 1;
            }
        }

        tracing::debug!(expired, evicted, remaining = inner.entries.len(), "cache at capacity");
    }

    /// Remove every entry.
    pub async fn clear(&self) {
        self.inner.lock().await.entries.clear();
    }

    /// Count total, valid and expired entries without evicting anything.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().await;
        let now = self.clock.now_millis();
        let total = inner.entries.len();
        let expired = inner
            .entries
            .values()
            .filter(|entry| self.is_expired(entry, now))
            .count();
        CacheStats { total, valid: total - expired, expired }
    }
}
