//! Shared surface of the keyed cache backends.
//!
//! Both the single-threaded [`KeyedCache`](crate::store::keyed::KeyedCache)
//! and the thread-safe `ConcurrentKeyedCache` keep the same read contract:
//! lookups by integer key only, with hit/miss accounting. They differ in how
//! writes are taken (`&mut self` vs. interior mutability), so the write side is
//! split into [`KeyedWrite`] and [`ConcurrentKeyedWrite`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::key::{CacheKey, IntKey};

/// Snapshot of per-cache metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreMetrics {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
}

/// Atomic counters behind [`StoreMetrics`].
#[derive(Debug, Default)]
pub(crate) struct StoreCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
}

impl StoreCounters {
    pub(crate) fn snapshot(&self) -> StoreMetrics {
        StoreMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
        }
    }

    #[inline]
    pub(crate) fn inc_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a write; `replaced` is true when the key already existed.
    #[inline]
    pub(crate) fn record_write(&self, replaced: bool) {
        if replaced {
            self.updates.fetch_add(1, Ordering::Relaxed);
        } else {
            self.inserts.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a lookup outcome and pass it through.
    #[inline]
    pub(crate) fn record_lookup<T>(&self, found: Option<T>) -> Option<T> {
        match found {
            Some(value) => {
                self.inc_hit();
                Some(value)
            },
            None => {
                self.inc_miss();
                None
            },
        }
    }
}

/// Read operations common to all keyed cache backends.
pub trait KeyedRead<V> {
    /// Fetch the value stored under an integer key.
    fn get(&self, key: IntKey) -> Option<Arc<V>>;

    /// Check whether an integer key has an entry. Does not touch metrics.
    fn has(&self, key: IntKey) -> bool;

    /// Number of entries, counting both integer and string keys.
    fn len(&self) -> usize;

    /// Check if the cache is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot the cache's metrics.
    fn metrics(&self) -> StoreMetrics;
}

/// Write operations for single-threaded backends.
pub trait KeyedWrite<V>: KeyedRead<V> {
    /// Insert or overwrite. Returns the previous value if present.
    fn set(&mut self, key: impl Into<CacheKey>, value: V) -> Option<Arc<V>>;
}

/// Write operations for concurrent backends (interior mutability).
pub trait ConcurrentKeyedWrite<V>: KeyedRead<V> + Send + Sync {
    /// Insert or overwrite. Returns the previous value if present.
    fn set(&self, key: impl Into<CacheKey>, value: V) -> Option<Arc<V>>;
}
