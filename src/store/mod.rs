pub mod keyed;
pub mod traits;

#[cfg(feature = "concurrency")]
pub use keyed::ConcurrentKeyedCache;
pub use keyed::KeyedCache;
pub use traits::{KeyedRead, KeyedWrite, StoreMetrics};
#[cfg(feature = "concurrency")]
pub use traits::ConcurrentKeyedWrite;
