//! Cache Entry Module
//!
//! Defines a single cached record and the millisecond clock it expires against.

use chrono::Utc;

// == Cache Entry ==
/// A single cached record: its key, payload and absolute expiration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<K, V> {
    /// Key the entry is indexed under
    pub key: K,
    /// The stored value
    pub value: V,
    /// Expiration timestamp (Unix milliseconds)
    pub expire_at: i64,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates a new entry expiring at `expire_at` (Unix milliseconds).
    pub fn new(key: K, value: V, expire_at: i64) -> Self {
        Self {
            key,
            value,
            expire_at,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired as of `now`.
    ///
    /// Boundary condition: an entry is expired only once `now` has moved strictly
    /// past `expire_at`. An entry read at exactly its expiration millisecond is
    /// still live.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expire_at < now
    }
}

// == Utility Functions ==
/// Returns the current Unix timestamp in milliseconds.
pub fn millisecond_now() -> i64 {
    Utc::now().timestamp_millis()
}
