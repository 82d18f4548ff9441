//! Cache Module
//!
//! Provides a bounded in-memory cache with LRU eviction and lazy TTL expiration.

mod entry;
mod lru;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::{millisecond_now, CacheEntry};
pub use shared::{CacheGuard, SharedCache};
pub use stats::CacheStats;
pub use store::LruCache;

// == Public Constants ==
/// Capacity used when a cache is configured with a maximum size of 0
pub const DEFAULT_MAX_SIZE: usize = 50_000;
