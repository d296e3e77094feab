pub use crate::builder::{NamePolicy, RegistryBuilder, RegistryConfig};
pub use crate::error::{ConfigError, InvalidNameReason, RegistryError};
pub use crate::key::{CacheKey, IntKey};
pub use crate::registry::{CacheRegistry, RegistryMetrics};
#[cfg(feature = "concurrency")]
pub use crate::registry::{global, ConcurrentCacheRegistry};
pub use crate::store::{KeyedCache, KeyedRead, KeyedWrite, StoreMetrics};
#[cfg(feature = "concurrency")]
pub use crate::store::{ConcurrentKeyedCache, ConcurrentKeyedWrite};
