//! Keyed cache backends.
//!
//! ## Architecture
//! - Entries live in an `FxHashMap<CacheKey, Arc<V>>` for O(1) lookup.
//! - No capacity bound, expiration, or eviction: an entry stays until it is
//!   overwritten or the cache is dropped with its registry.
//! - The concurrent variant wraps the same map in a `parking_lot::RwLock`.
//!
//! ## Key Components
//! - [`KeyedCache`]: single-threaded cache, written through `&mut self`.
//! - `ConcurrentKeyedCache`: thread-safe cache, written through `&self`
//!   (feature `concurrency`).
//!
//! ## Core Operations
//! - `set`: insert or overwrite by integer or string key (last write wins).
//! - `get`: fetch by integer key, counting hits and misses.
//! - `has`: existence check by integer key.
//!
//! ## Key Asymmetry
//! `set` takes any [`CacheKey`], while `get`/`has` take an [`IntKey`]. Values
//! written under a string key are stored and counted by `len`, but there is no
//! read path for them.
//!
//! ## Example Usage
//! ```rust
//! use cache_registry::store::keyed::KeyedCache;
//!
//! let mut cache: KeyedCache<String> = KeyedCache::new("passages");
//! cache.set(1, "Start".to_string());
//! cache.set("draft", "Untitled".to_string());
//!
//! assert!(cache.has(1));
//! assert_eq!(cache.get(1).as_deref(), Some(&"Start".to_string()));
//! assert_eq!(cache.get(2), None);
//! assert_eq!(cache.len(), 2);
//! ```
//!
//! ## Thread Safety
//! - `KeyedCache` is `Send + Sync` when `V` is, but writes need `&mut`.
//! - `ConcurrentKeyedCache` is shared through `Arc` handles.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::key::{CacheKey, IntKey};
use crate::store::traits::{KeyedRead, KeyedWrite, StoreCounters, StoreMetrics};
#[cfg(feature = "concurrency")]
use crate::store::traits::ConcurrentKeyedWrite;

/// Single-threaded keyed cache.
///
/// Usually obtained from
/// [`CacheRegistry::get_or_create`](crate::registry::CacheRegistry::get_or_create),
/// which owns it; callers work through the returned borrow.
pub struct KeyedCache<V> {
    name: Arc<str>,
    entries: FxHashMap<CacheKey, Arc<V>>,
    metrics: StoreCounters,
}

impl<V> KeyedCache<V> {
    /// Create an empty cache labelled `name`.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self::with_capacity(name, 0)
    }

    /// Create an empty cache with room for `capacity` entries before
    /// reallocating. This is a preallocation hint, not a bound.
    pub fn with_capacity(name: impl Into<Arc<str>>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            metrics: StoreCounters::default(),
        }
    }

    /// The name this cache is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert or overwrite the entry for `key`.
    ///
    /// Returns the previous value if the key existed. Never fails.
    pub fn set(&mut self, key: impl Into<CacheKey>, value: V) -> Option<Arc<V>> {
        let key = key.into();
        trace!(cache = %self.name, %key, "set");
        let previous = self.entries.insert(key, Arc::new(value));
        self.metrics.record_write(previous.is_some());
        previous
    }

    /// Fetch the value stored under integer `key`, or `None` when absent.
    pub fn get(&self, key: IntKey) -> Option<Arc<V>> {
        self.metrics
            .record_lookup(self.entries.get(&CacheKey::Int(key)).cloned())
    }

    /// Borrow the value under integer `key` without touching metrics.
    pub fn peek(&self, key: IntKey) -> Option<&V> {
        self.entries.get(&CacheKey::Int(key)).map(Arc::as_ref)
    }

    /// `true` when integer `key` has an entry.
    pub fn has(&self, key: IntKey) -> bool {
        self.entries.contains_key(&CacheKey::Int(key))
    }

    /// Number of entries, string-keyed ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries the cache can hold before reallocating. Not a bound.
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Snapshot hit/miss/insert/update counters.
    pub fn metrics(&self) -> StoreMetrics {
        self.metrics.snapshot()
    }
}

impl<V> fmt::Debug for KeyedCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedCache")
            .field("name", &self.name)
            .field("len", &self.entries.len())
            .field("value_type", &std::any::type_name::<V>())
            .finish()
    }
}

impl<V> KeyedRead<V> for KeyedCache<V> {
    fn get(&self, key: IntKey) -> Option<Arc<V>> {
        KeyedCache::get(self, key)
    }

    fn has(&self, key: IntKey) -> bool {
        KeyedCache::has(self, key)
    }

    fn len(&self) -> usize {
        KeyedCache::len(self)
    }

    fn metrics(&self) -> StoreMetrics {
        KeyedCache::metrics(self)
    }
}

impl<V> KeyedWrite<V> for KeyedCache<V> {
    fn set(&mut self, key: impl Into<CacheKey>, value: V) -> Option<Arc<V>> {
        KeyedCache::set(self, key, value)
    }
}

/// Thread-safe keyed cache using interior mutability.
///
/// Handed out as `Arc<ConcurrentKeyedCache<V>>` by
/// [`ConcurrentCacheRegistry`](crate::registry::ConcurrentCacheRegistry).
#[cfg(feature = "concurrency")]
pub struct ConcurrentKeyedCache<V> {
    name: Arc<str>,
    entries: RwLock<FxHashMap<CacheKey, Arc<V>>>,
    metrics: StoreCounters,
}

#[cfg(feature = "concurrency")]
impl<V> ConcurrentKeyedCache<V> {
    /// Create an empty cache labelled `name`.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self::with_capacity(name, 0)
    }

    /// Create an empty cache with a preallocation hint.
    pub fn with_capacity(name: impl Into<Arc<str>>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
            metrics: StoreCounters::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert or overwrite the entry for `key`. Returns the previous value.
    pub fn set(&self, key: impl Into<CacheKey>, value: V) -> Option<Arc<V>> {
        let key = key.into();
        trace!(cache = %self.name, %key, "set");
        let previous = self.entries.write().insert(key, Arc::new(value));
        self.metrics.record_write(previous.is_some());
        previous
    }

    /// Fetch the value stored under integer `key`, or `None` when absent.
    pub fn get(&self, key: IntKey) -> Option<Arc<V>> {
        let found = self.entries.read().get(&CacheKey::Int(key)).cloned();
        self.metrics.record_lookup(found)
    }

    /// `true` when integer `key` has an entry.
    pub fn has(&self, key: IntKey) -> bool {
        self.entries.read().contains_key(&CacheKey::Int(key))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries the cache can hold before reallocating. Not a bound.
    pub fn capacity(&self) -> usize {
        self.entries.read().capacity()
    }

    pub fn metrics(&self) -> StoreMetrics {
        self.metrics.snapshot()
    }
}

#[cfg(feature = "concurrency")]
impl<V> fmt::Debug for ConcurrentKeyedCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentKeyedCache")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("value_type", &std::any::type_name::<V>())
            .finish()
    }
}

#[cfg(feature = "concurrency")]
impl<V> KeyedRead<V> for ConcurrentKeyedCache<V> {
    fn get(&self, key: IntKey) -> Option<Arc<V>> {
        ConcurrentKeyedCache::get(self, key)
    }

    fn has(&self, key: IntKey) -> bool {
        ConcurrentKeyedCache::has(self, key)
    }

    fn len(&self) -> usize {
        ConcurrentKeyedCache::len(self)
    }

    fn metrics(&self) -> StoreMetrics {
        ConcurrentKeyedCache::metrics(self)
    }
}

#[cfg(feature = "concurrency")]
impl<V> ConcurrentKeyedWrite<V> for ConcurrentKeyedCache<V>
where
    V: Send + Sync,
{
    fn set(&self, key: impl Into<CacheKey>, value: V) -> Option<Arc<V>> {
        ConcurrentKeyedCache::set(self, key, value)
    }
}
