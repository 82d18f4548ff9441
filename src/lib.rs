//! ttl_lru - A bounded in-memory LRU cache with per-entry expiration
//!
//! The cache evicts the least recently used entry when full and expires
//! entries lazily on lookup. It is shared through a single caller-held lock
//! so compound operations can run atomically. A small HTTP server and a
//! pull-based metrics collector are built on top.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;

pub use api::AppState;
pub use cache::{CacheGuard, LruCache, SharedCache};
pub use config::Config;
pub use metrics::Collector;
