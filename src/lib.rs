//! cache-registry: named keyed caches shared through a registry.
//!
//! A [`CacheRegistry`](registry::CacheRegistry) maps a cache name to exactly
//! one [`KeyedCache`](store::keyed::KeyedCache). The thread-safe variants and
//! the process-wide [`global`](registry::global) registry live behind the
//! `concurrency` feature (on by default).

pub mod builder;
pub mod error;
pub mod key;
pub mod prelude;
pub mod registry;
pub mod store;
