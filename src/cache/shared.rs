//! Shared Cache Module
//!
//! Puts an [`LruCache`] behind a single mutex and hands callers the guard.
//!
//! The cache methods take `&mut self`, so the only way to reach them from a
//! shared handle is through [`SharedCache::lock`]. Holding the returned
//! [`CacheGuard`] across several calls makes that sequence atomic with respect
//! to every other thread using the cache.
//!
//! # Example
//! ```
//! use ttl_lru::cache::{millisecond_now, LruCache, SharedCache};
//!
//! let cache = SharedCache::new(LruCache::new(100));
//!
//! // get-or-compute as one critical section
//! let mut guard = cache.lock();
//! let cached = guard.get("answer").copied();
//! let value = match cached {
//!     Some(value) => value,
//!     None => {
//!         guard.add("answer", 42, millisecond_now() + 60_000);
//!         42
//!     }
//! };
//! guard.release();
//! assert_eq!(value, 42);
//! ```

use std::fmt;
use std::hash::Hash;
use std::ops::{Deref, DerefMut};

use parking_lot::{Mutex, MutexGuard};

use crate::cache::LruCache;

// == Shared Cache ==
/// An [`LruCache`] guarded by one whole-cache mutex.
pub struct SharedCache<K, V> {
    inner: Mutex<LruCache<K, V>>,
}

impl<K, V> SharedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    pub fn new(cache: LruCache<K, V>) -> Self {
        Self {
            inner: Mutex::new(cache),
        }
    }

    // == Lock ==
    /// Blocks until the cache lock is acquired.
    ///
    /// The lock is released when the guard is dropped or
    /// [`CacheGuard::release`] is called.
    pub fn lock(&self) -> CacheGuard<'_, K, V> {
        CacheGuard {
            guard: self.inner.lock(),
        }
    }

    /// Acquires the lock only if it is free right now.
    pub fn try_lock(&self) -> Option<CacheGuard<'_, K, V>> {
        self.inner.try_lock().map(|guard| CacheGuard { guard })
    }

    /// Consumes the wrapper and returns the cache.
    pub fn into_inner(self) -> LruCache<K, V> {
        self.inner.into_inner()
    }
}

impl<K, V> From<LruCache<K, V>> for SharedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn from(cache: LruCache<K, V>) -> Self {
        Self::new(cache)
    }
}

impl<K, V> fmt::Debug for SharedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCache").finish_non_exhaustive()
    }
}

// == Cache Guard ==
/// Exclusive access to a [`SharedCache`] for the lifetime of the guard.
///
/// Must not be held across an `.await` point.
pub struct CacheGuard<'a, K, V> {
    guard: MutexGuard<'a, LruCache<K, V>>,
}

impl<K, V> CacheGuard<'_, K, V> {
    /// Releases the lock before the guard goes out of scope.
    pub fn release(self) {
        drop(self);
    }
}

impl<K, V> Deref for CacheGuard<'_, K, V> {
    type Target = LruCache<K, V>;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl<K, V> DerefMut for CacheGuard<'_, K, V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}
