//! Named-cache registry.
//!
//! A registry is a directory from cache name to exactly one keyed cache.
//! Independent parts of a program rendezvous on the same cache by agreeing on
//! a name, without threading the cache itself through every call path.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ CacheRegistry                                                        │
//! │                                                                      │
//! │   directory: FxHashMap<Box<str>, Slot>                               │
//! │                                                                      │
//! │   "users"    ──► Slot { KeyedCache<User>,    type: "app::User" }     │
//! │   "sessions" ──► Slot { KeyedCache<Session>, type: "app::Session" }  │
//! │                                                                      │
//! │   get_or_create::<V>(name)                                           │
//! │     1. validate name against RegistryConfig                          │
//! │     2. absent  → insert empty KeyedCache<V>                          │
//! │        present → reuse                                               │
//! │     3. downcast to KeyedCache<V>, or TypeMismatch                    │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Components
//!
//! - [`CacheRegistry`]: single-threaded registry; hands out `&mut KeyedCache<V>`
//!   borrows tied to the registry.
//! - `ConcurrentCacheRegistry` (feature `concurrency`): thread-safe registry;
//!   hands out `Arc<ConcurrentKeyedCache<V>>` handles.
//! - `global()` (feature `concurrency`): lazily created process-wide
//!   `ConcurrentCacheRegistry`.
//!
//! ## Invariants
//!
//! - At most one cache exists per name. Repeated lookups return the same
//!   instance, never a copy.
//! - The value type is fixed by the first lookup for a name. Later lookups
//!   with another type fail with [`RegistryError::TypeMismatch`] and leave the
//!   existing cache untouched.
//! - Caches are never removed from the directory.
//!
//! ## Example Usage
//!
//! ```rust
//! use cache_registry::registry::CacheRegistry;
//!
//! #[derive(Debug, PartialEq)]
//! struct User {
//!     name: &'static str,
//! }
//!
//! let mut registry = CacheRegistry::new();
//! registry
//!     .get_or_create::<User>("users")
//!     .unwrap()
//!     .set(1, User { name: "a" });
//!
//! let users = registry.get_or_create::<User>("users").unwrap();
//! assert_eq!(users.get(1).as_deref(), Some(&User { name: "a" }));
//!
//! let sessions = registry.get_or_create::<User>("sessions").unwrap();
//! assert!(!sessions.has(1));
//! ```

use std::any::{type_name, Any};
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(feature = "concurrency")]
use std::sync::{Arc, OnceLock};

#[cfg(feature = "concurrency")]
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::builder::RegistryConfig;
use crate::error::RegistryError;
use crate::store::keyed::KeyedCache;
#[cfg(feature = "concurrency")]
use crate::store::keyed::ConcurrentKeyedCache;

/// Snapshot of registry-level metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryMetrics {
    /// Caches created by a first lookup.
    pub caches_created: u64,
    /// Lookups that found an existing cache of the right type.
    pub lookups_reused: u64,
    /// Lookups rejected for an invalid name or a type mismatch.
    pub lookups_rejected: u64,
}

#[derive(Debug, Default)]
struct RegistryCounters {
    created: AtomicU64,
    reused: AtomicU64,
    rejected: AtomicU64,
}

impl RegistryCounters {
    fn snapshot(&self) -> RegistryMetrics {
        RegistryMetrics {
            caches_created: self.created.load(Ordering::Relaxed),
            lookups_reused: self.reused.load(Ordering::Relaxed),
            lookups_rejected: self.rejected.load(Ordering::Relaxed),
        }
    }

    fn inc_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_reused(&self) {
        self.reused.fetch_add(1, Ordering::Relaxed);
    }

    /// Count and log a rejected lookup, handing the error back.
    fn reject(&self, err: RegistryError) -> RegistryError {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        warn!(cache = err.name(), error = %err, "cache lookup rejected");
        err
    }
}

fn mismatch<V>(name: &str, existing: &'static str) -> RegistryError {
    RegistryError::TypeMismatch {
        name: name.to_owned(),
        existing,
        requested: type_name::<V>(),
    }
}

// ---------------------------------------------------------------------------
// CacheRegistry
// ---------------------------------------------------------------------------

struct Slot {
    cache: Box<dyn Any>,
    type_name: &'static str,
}

/// Single-threaded named-cache registry.
///
/// Pass the registry (or `&mut` to it) to the components that need shared
/// caches; every component asking for the same name sees the same cache.
#[derive(Default)]
pub struct CacheRegistry {
    directory: FxHashMap<Box<str>, Slot>,
    config: RegistryConfig,
    counters: RegistryCounters,
}

impl CacheRegistry {
    /// Create an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with `config`.
    ///
    /// Use [`RegistryBuilder`](crate::builder::RegistryBuilder) to validate a
    /// configuration first.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            directory: FxHashMap::default(),
            config,
            counters: RegistryCounters::default(),
        }
    }

    /// Return the cache registered as `name`, creating an empty one first if
    /// the name is new.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidName`] if `name` fails validation.
    /// - [`RegistryError::TypeMismatch`] if `name` was created with a value
    ///   type other than `V`.
    pub fn get_or_create<V: 'static>(
        &mut self,
        name: &str,
    ) -> Result<&mut KeyedCache<V>, RegistryError> {
        if let Err(err) = self.config.validate_name(name) {
            return Err(self.counters.reject(err));
        }

        let capacity = self.config.initial_cache_capacity;
        let (slot, created) = match self.directory.entry(Box::from(name)) {
            Entry::Occupied(entry) => (entry.into_mut(), false),
            Entry::Vacant(entry) => {
                let value_type = type_name::<V>();
                debug!(cache = name, value_type, "creating cache");
                self.counters.inc_created();
                let slot = entry.insert(Slot {
                    cache: Box::new(KeyedCache::<V>::with_capacity(name, capacity)),
                    type_name: value_type,
                });
                (slot, true)
            },
        };

        let existing = slot.type_name;
        match slot.cache.downcast_mut::<KeyedCache<V>>() {
            Some(cache) => {
                if !created {
                    trace!(cache = name, "reusing cache");
                    self.counters.inc_reused();
                }
                Ok(cache)
            },
            None => Err(self.counters.reject(mismatch::<V>(name, existing))),
        }
    }

    /// Look up `name` without creating it.
    ///
    /// Returns `Ok(None)` if no cache is registered under the name.
    ///
    /// # Errors
    ///
    /// Same conditions as [`get_or_create`](Self::get_or_create).
    pub fn get<V: 'static>(&self, name: &str) -> Result<Option<&KeyedCache<V>>, RegistryError> {
        if let Err(err) = self.config.validate_name(name) {
            return Err(self.counters.reject(err));
        }
        let Some(slot) = self.directory.get(name) else {
            return Ok(None);
        };
        match slot.cache.downcast_ref::<KeyedCache<V>>() {
            Some(cache) => {
                self.counters.inc_reused();
                Ok(Some(cache))
            },
            None => Err(self.counters.reject(mismatch::<V>(name, slot.type_name))),
        }
    }

    /// `true` if a cache is registered under `name`, whatever its value type.
    pub fn contains(&self, name: &str) -> bool {
        self.directory.contains_key(name)
    }

    /// Value type a registered cache was created with.
    pub fn value_type(&self, name: &str) -> Option<&'static str> {
        self.directory.get(name).map(|slot| slot.type_name)
    }

    /// Number of registered caches.
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    /// Iterate over registered cache names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.directory.keys().map(|name| &**name)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn metrics(&self) -> RegistryMetrics {
        self.counters.snapshot()
    }
}

impl fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("caches", &self.directory.len())
            .field("config", &self.config)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ConcurrentCacheRegistry
// ---------------------------------------------------------------------------

#[cfg(feature = "concurrency")]
struct SharedSlot {
    cache: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

#[cfg(feature = "concurrency")]
impl SharedSlot {
    fn typed<V: Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Arc<ConcurrentKeyedCache<V>>, RegistryError> {
        Arc::clone(&self.cache)
            .downcast::<ConcurrentKeyedCache<V>>()
            .map_err(|_| mismatch::<V>(name, self.type_name))
    }
}

/// Thread-safe named-cache registry.
///
/// Lookups take `&self`, so the registry can sit behind an `Arc` or in a
/// `static` (see [`global`]). Handles are `Arc` clones of the instance the
/// directory owns.
#[cfg(feature = "concurrency")]
#[derive(Default)]
pub struct ConcurrentCacheRegistry {
    directory: RwLock<FxHashMap<Box<str>, SharedSlot>>,
    config: RegistryConfig,
    counters: RegistryCounters,
}

#[cfg(feature = "concurrency")]
impl ConcurrentCacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            directory: RwLock::new(FxHashMap::default()),
            config,
            counters: RegistryCounters::default(),
        }
    }

    /// Return a handle to the cache registered as `name`, creating an empty
    /// one first if the name is new.
    ///
    /// Concurrent first lookups for one name converge on a single cache.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidName`] if `name` fails validation.
    /// - [`RegistryError::TypeMismatch`] if `name` was created with a value
    ///   type other than `V`.
    pub fn get_or_create<V: Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Arc<ConcurrentKeyedCache<V>>, RegistryError> {
        if let Err(err) = self.config.validate_name(name) {
            return Err(self.counters.reject(err));
        }

        if let Some(slot) = self.directory.read().get(name) {
            return self.finish_lookup(slot.typed::<V>(name), name);
        }

        let mut directory = self.directory.write();
        // Another thread may have created it between the two locks.
        let found = match directory.entry(Box::from(name)) {
            Entry::Occupied(entry) => entry.get().typed::<V>(name),
            Entry::Vacant(entry) => {
                let value_type = type_name::<V>();
                debug!(cache = name, value_type, "creating cache");
                let cache = Arc::new(ConcurrentKeyedCache::<V>::with_capacity(
                    name,
                    self.config.initial_cache_capacity,
                ));
                entry.insert(SharedSlot {
                    cache: cache.clone(),
                    type_name: value_type,
                });
                self.counters.inc_created();
                return Ok(cache);
            },
        };
        drop(directory);
        self.finish_lookup(found, name)
    }

    /// Look up `name` without creating it.
    ///
    /// # Errors
    ///
    /// Same conditions as [`get_or_create`](Self::get_or_create).
    pub fn get<V: Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Option<Arc<ConcurrentKeyedCache<V>>>, RegistryError> {
        if let Err(err) = self.config.validate_name(name) {
            return Err(self.counters.reject(err));
        }
        let found = match self.directory.read().get(name) {
            Some(slot) => slot.typed::<V>(name),
            None => return Ok(None),
        };
        self.finish_lookup(found, name).map(Some)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.directory.read().contains_key(name)
    }

    pub fn value_type(&self, name: &str) -> Option<&'static str> {
        self.directory.read().get(name).map(|slot| slot.type_name)
    }

    pub fn len(&self) -> usize {
        self.directory.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of registered cache names, in no particular order.
    pub fn names(&self) -> Vec<String> {
        self.directory
            .read()
            .keys()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn metrics(&self) -> RegistryMetrics {
        self.counters.snapshot()
    }

    fn finish_lookup<V>(
        &self,
        found: Result<Arc<ConcurrentKeyedCache<V>>, RegistryError>,
        name: &str,
    ) -> Result<Arc<ConcurrentKeyedCache<V>>, RegistryError> {
        match found {
            Ok(cache) => {
                trace!(cache = name, "reusing cache");
                self.counters.inc_reused();
                Ok(cache)
            },
            Err(err) => Err(self.counters.reject(err)),
        }
    }
}

#[cfg(feature = "concurrency")]
impl fmt::Debug for ConcurrentCacheRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentCacheRegistry")
            .field("caches", &self.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Process-wide registry with the default configuration.
///
/// Created on first use and alive until the process exits. Prefer passing an
/// explicit [`ConcurrentCacheRegistry`] or [`CacheRegistry`] where the
/// callers can be reached; this exists for code that cannot.
///
/// ```rust
/// use cache_registry::registry::global;
///
/// global().get_or_create::<String>("doc:global:titles").unwrap().set(1, "Intro".into());
/// let titles = global().get_or_create::<String>("doc:global:titles").unwrap();
/// assert!(titles.has(1));
/// ```
#[cfg(feature = "concurrency")]
pub fn global() -> &'static ConcurrentCacheRegistry {
    static GLOBAL: OnceLock<ConcurrentCacheRegistry> = OnceLock::new();
    GLOBAL.get_or_init(ConcurrentCacheRegistry::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{NamePolicy, RegistryBuilder};
    use crate::error::InvalidNameReason;

    #[derive(Debug, Clone, PartialEq)]
    struct User {
        name: &'static str,
    }

    #[test]
    fn repeated_lookup_returns_same_instance() {
        let mut registry = CacheRegistry::new();
        let first = registry.get_or_create::<User>("users").unwrap() as *const KeyedCache<User>;
        let second = registry.get_or_create::<User>("users").unwrap() as *const KeyedCache<User>;
        assert!(std::ptr::eq(first, second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn distinct_names_are_independent() {
        let mut registry = CacheRegistry::new();
        registry
            .get_or_create::<User>("sessions")
            .unwrap()
            .set(1, User { name: "s" });
        let users = registry.get_or_create::<User>("users").unwrap();
        assert!(!users.has(1));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn writes_are_visible_through_later_lookups() {
        let mut registry = CacheRegistry::new();
        registry
            .get_or_create::<User>("users")
            .unwrap()
            .set(1, User { name: "a" });

        let users = registry.get_or_create::<User>("users").unwrap();
        assert_eq!(users.get(1).as_deref(), Some(&User { name: "a" }));
    }

    #[test]
    fn type_mismatch_is_rejected_and_cache_survives() {
        let mut registry = CacheRegistry::new();
        registry.get_or_create::<User>("users").unwrap().set(1, User { name: "a" });

        let err = registry.get_or_create::<u64>("users").unwrap_err();
        assert_eq!(
            err,
            RegistryError::TypeMismatch {
                name: "users".into(),
                existing: type_name::<User>(),
                requested: type_name::<u64>(),
            }
        );

        let users = registry.get_or_create::<User>("users").unwrap();
        assert!(users.has(1));
        assert_eq!(registry.metrics().lookups_rejected, 1);
    }

    #[test]
    fn blank_names_are_rejected_by_default() {
        let mut registry = CacheRegistry::new();
        for name in ["", "  ", "\t"] {
            assert!(matches!(
                registry.get_or_create::<User>(name),
                Err(RegistryError::InvalidName { .. })
            ));
        }
        assert!(registry.is_empty());
        assert_eq!(registry.metrics().lookups_rejected, 3);
    }

    #[test]
    fn permissive_registry_treats_empty_name_as_ordinary() {
        let mut registry = RegistryBuilder::new()
            .name_policy(NamePolicy::Permissive)
            .build();
        registry.get_or_create::<u8>("").unwrap().set(1, 9);
        assert_eq!(registry.get_or_create::<u8>("").unwrap().peek(1), Some(&9));
        assert!(registry.contains(""));
    }

    #[test]
    fn too_long_names_are_rejected() {
        let mut registry = RegistryBuilder::new().max_name_len(Some(3)).build();
        let err = registry.get_or_create::<u8>("abcd").unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidName {
                reason: InvalidNameReason::TooLong { max: 3 },
                ..
            }
        ));
    }

    #[test]
    fn long_names_are_ordinary_names() {
        let long = "n".repeat(300);
        let mut permissive = RegistryBuilder::new()
            .name_policy(NamePolicy::Permissive)
            .max_name_len(Some(16))
            .build();
        permissive.get_or_create::<u8>(&long).unwrap().set(1, 1);
        assert!(permissive.get_or_create::<u8>(&long).unwrap().has(1));

        let mut registry = CacheRegistry::new();
        let story = format!("story:{}:passages", "x".repeat(260));
        registry.get_or_create::<u8>(&story).unwrap().set(2, 2);
        assert!(registry.contains(&story));
    }

    #[test]
    fn zero_length_limit_rejects_every_name() {
        let mut registry = RegistryBuilder::new().max_name_len(Some(0)).build();
        assert!(registry.get_or_create::<u8>("a").is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn get_does_not_create() {
        let mut registry = CacheRegistry::new();
        assert!(registry.get::<User>("users").unwrap().is_none());
        assert!(!registry.contains("users"));

        registry.get_or_create::<User>("users").unwrap().set(2, User { name: "b" });
        let users = registry.get::<User>("users").unwrap().unwrap();
        assert!(users.has(2));
        assert!(registry.get::<String>("users").is_err());
    }

    #[test]
    fn directory_introspection() {
        let mut registry = CacheRegistry::new();
        registry.get_or_create::<User>("users").unwrap();
        registry.get_or_create::<String>("titles").unwrap();

        let mut names: Vec<&str> = registry.names().collect();
        names.sort_unstable();
        assert_eq!(names, ["titles", "users"]);
        assert_eq!(registry.value_type("users"), Some(type_name::<User>()));
        assert_eq!(registry.value_type("missing"), None);
    }

    #[test]
    fn metrics_track_created_caches() {
        let mut registry = CacheRegistry::new();
        registry.get_or_create::<u8>("a").unwrap();
        registry.get_or_create::<u8>("a").unwrap();
        registry.get_or_create::<u8>("b").unwrap();
        let _ = registry.get::<u8>("a");

        let m = registry.metrics();
        assert_eq!(m.caches_created, 2);
        assert_eq!(m.lookups_rejected, 0);
    }

    #[test]
    fn new_caches_are_labelled_with_their_name() {
        let mut registry = CacheRegistry::new();
        assert_eq!(registry.get_or_create::<u8>("passages").unwrap().name(), "passages");
    }

    #[cfg(feature = "concurrency")]
    mod concurrent {
        use super::*;

        #[test]
        fn repeated_lookup_returns_same_arc() {
            let registry = ConcurrentCacheRegistry::new();
            let a = registry.get_or_create::<User>("users").unwrap();
            let b = registry.get_or_create::<User>("users").unwrap();
            assert!(Arc::ptr_eq(&a, &b));

            a.set(1, User { name: "a" });
            assert_eq!(b.get(1).as_deref(), Some(&User { name: "a" }));
        }

        #[test]
        fn distinct_names_are_independent() {
            let registry = ConcurrentCacheRegistry::new();
            let users = registry.get_or_create::<User>("users").unwrap();
            let sessions = registry.get_or_create::<User>("sessions").unwrap();
            assert!(!Arc::ptr_eq(&users, &sessions));

            sessions.set(1, User { name: "s" });
            assert!(!users.has(1));
        }

        #[test]
        fn type_mismatch_is_rejected() {
            let registry = ConcurrentCacheRegistry::new();
            registry.get_or_create::<User>("users").unwrap();
            assert!(matches!(
                registry.get_or_create::<String>("users"),
                Err(RegistryError::TypeMismatch { .. })
            ));
            assert!(matches!(
                registry.get::<String>("users"),
                Err(RegistryError::TypeMismatch { .. })
            ));
        }

        #[test]
        fn get_does_not_create() {
            let registry = ConcurrentCacheRegistry::new();
            assert!(registry.get::<User>("users").unwrap().is_none());
            assert!(registry.is_empty());
        }

        #[test]
        fn metrics_and_names() {
            let registry = RegistryBuilder::new().try_build_concurrent().unwrap();
            registry.get_or_create::<u8>("a").unwrap();
            registry.get_or_create::<u8>("a").unwrap();
            let _ = registry.get_or_create::<u8>(" ");

            let m = registry.metrics();
            assert_eq!(m.caches_created, 1);
            assert_eq!(m.lookups_reused, 1);
            assert_eq!(m.lookups_rejected, 1);
            assert_eq!(registry.names(), vec!["a".to_string()]);
        }

        #[test]
        fn global_is_one_instance() {
            assert!(std::ptr::eq(global(), global()));
            let a = global().get_or_create::<u32>("registry-tests:global").unwrap();
            let b = global().get_or_create::<u32>("registry-tests:global").unwrap();
            assert!(Arc::ptr_eq(&a, &b));
        }
    }
}
