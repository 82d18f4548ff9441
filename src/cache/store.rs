//! Cache Store Module
//!
//! Main cache engine combining a key index with recency ordering and lazy TTL
//! expiration.
//!
//! `LruCache` is not synchronized on its own. Share it between threads through
//! [`SharedCache`](crate::cache::SharedCache), whose guard must be held around
//! every call, so compound sequences such as "get, and on a miss compute and
//! add" run as one atomic step.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use tracing::trace;

use crate::cache::entry::millisecond_now;
use crate::cache::lru::LruList;
use crate::cache::{CacheEntry, CacheStats, DEFAULT_MAX_SIZE};

// == LRU Cache ==
/// Bounded LRU cache whose entries carry an absolute expiration time.
///
/// Capacity eviction and expiration are independent. When an insert pushes
/// the cache over capacity, the least recently used entry is evicted whether
/// or not it has expired. Expired entries are only purged when a lookup finds
/// them; until then they keep occupying a slot.
#[derive(Debug)]
pub struct LruCache<K, V> {
    /// Key to slot handle in `list`
    index: HashMap<K, usize>,
    /// Entries in recency order
    list: LruList<CacheEntry<K, V>>,
    /// Lookup statistics
    stats: CacheStats,
    /// Maximum number of entries, 0 = unbounded
    max_size: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a cache holding at most `max_size` entries.
    ///
    /// A `max_size` of 0 falls back to [`DEFAULT_MAX_SIZE`]. Use
    /// [`LruCache::unbounded`] to disable capacity eviction.
    pub fn new(max_size: usize) -> Self {
        let max_size = if max_size == 0 {
            DEFAULT_MAX_SIZE
        } else {
            max_size
        };
        Self::with_max_size(max_size)
    }

    /// Creates a cache that never evicts for capacity.
    pub fn unbounded() -> Self {
        Self::with_max_size(0)
    }

    fn with_max_size(max_size: usize) -> Self {
        Self {
            index: HashMap::new(),
            list: LruList::new(),
            stats: CacheStats::new(),
            max_size,
        }
    }

    // == Add ==
    /// Stores a value that expires at `expire_at` (Unix milliseconds).
    ///
    /// If the key already exists, its value and expiration are overwritten in
    /// place and it becomes the most recently used entry. Otherwise the entry
    /// is inserted at the front and, if that pushes the cache over capacity,
    /// the least recently used entry is evicted.
    ///
    /// Returns `true` if the key already existed.
    pub fn add(&mut self, key: K, value: V, expire_at: i64) -> bool {
        if let Some(&slot) = self.index.get(&key) {
            self.list.move_to_front(slot);
            let entry = self.list.get_mut(slot);
            entry.value = value;
            entry.expire_at = expire_at;
            return true;
        }

        let slot = self
            .list
            .push_front(CacheEntry::new(key.clone(), value, expire_at));
        self.index.insert(key, slot);

        if self.max_size != 0 && self.list.len() > self.max_size {
            self.remove_oldest();
        }
        false
    }

    // == Get ==
    /// Looks up a live value, marking it as most recently used.
    ///
    /// An entry whose expiration has passed is removed and reported as a miss.
    /// Every call counts exactly one hit or one miss.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_at(key, millisecond_now())
    }

    pub(crate) fn get_at<Q>(&mut self, key: &Q, now: i64) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&slot) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if self.list.get(slot).is_expired_at(now) {
            self.remove_slot(slot);
            self.stats.record_miss();
            trace!(size = self.list.len(), "purged expired cache entry");
            return None;
        }

        self.stats.record_hit();
        self.list.move_to_front(slot);
        Some(&self.list.get(slot).value)
    }

    // == Remove ==
    /// Removes an entry. Does nothing if the key is absent.
    pub fn remove<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(slot) = self.index.remove(key) {
            self.list.remove(slot);
        }
    }

    // == Update Expiration ==
    /// Replaces the expiration of an existing entry without touching its value
    /// or its recency.
    ///
    /// Returns `false` and leaves the cache untouched if the key is absent.
    pub fn update_expiration<Q>(&mut self, key: &Q, expire_at: i64) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index.get(key) {
            Some(&slot) => {
                self.list.get_mut(slot).expire_at = expire_at;
                true
            }
            None => false,
        }
    }

    // == Contains ==
    /// Checks for a key without counting a lookup, refreshing recency or
    /// checking expiration.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    // == Keys ==
    /// Iterates keys from most to least recently used, expired ones included.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.list.iter().map(|entry| &entry.key)
    }

    // == Stats ==
    /// Returns a snapshot of the lookup counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    // == Capacity ==
    /// Returns the entry limit, or None if the cache is unbounded.
    pub fn capacity(&self) -> Option<usize> {
        (self.max_size != 0).then_some(self.max_size)
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    // == Eviction ==
    fn remove_oldest(&mut self) {
        if let Some(slot) = self.list.back() {
            self.remove_slot(slot);
            trace!(max_size = self.max_size, "evicted least recently used cache entry");
        }
    }

    fn remove_slot(&mut self, slot: usize) {
        let entry = self.list.remove(slot);
        self.index.remove(&entry.key);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    fn keys(cache: &LruCache<String, i32>) -> Vec<&str> {
        cache.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_store_new() {
        let cache: LruCache<String, i32> = LruCache::new(100);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), Some(100));
    }

    #[test]
    fn test_store_zero_size_uses_default() {
        let cache: LruCache<String, i32> = LruCache::new(0);
        assert_eq!(cache.capacity(), Some(DEFAULT_MAX_SIZE));
    }

    #[test]
    fn test_store_unbounded() {
        let mut cache = LruCache::unbounded();
        assert_eq!(cache.capacity(), None);

        for i in 0..1_000 {
            cache.add(i, i, NOW + 1_000);
        }
        assert_eq!(cache.len(), 1_000);
        assert!(cache.contains(&0));
    }

    #[test]
    fn test_store_add_and_get() {
        let mut cache = LruCache::new(100);

        assert!(!cache.add("key1".to_string(), 1, NOW + 1_000));
        assert_eq!(cache.get_at("key1", NOW), Some(&1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut cache: LruCache<String, i32> = LruCache::new(100);

        assert_eq!(cache.get("nonexistent"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_store_remove() {
        let mut cache = LruCache::new(100);

        cache.add("key1".to_string(), 1, NOW + 1_000);
        cache.remove("key1");

        assert!(cache.is_empty());
        assert_eq!(cache.get_at("key1", NOW), None);
    }

    #[test]
    fn test_store_remove_nonexistent() {
        let mut cache = LruCache::new(100);
        cache.add("key1".to_string(), 1, NOW + 1_000);

        cache.remove("nonexistent");

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats(), CacheStats::new());
    }

    #[test]
    fn test_store_overwrite() {
        let mut cache = LruCache::new(100);

        assert!(!cache.add("key1".to_string(), 1, NOW + 1_000));
        assert!(cache.add("key1".to_string(), 2, NOW + 1_000));

        assert_eq!(cache.get_at("key1", NOW), Some(&2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_store_overwrite_moves_to_front() {
        let mut cache = LruCache::new(3);

        cache.add("a".to_string(), 1, NOW + 1_000);
        cache.add("b".to_string(), 2, NOW + 1_000);
        cache.add("c".to_string(), 3, NOW + 1_000);
        cache.add("a".to_string(), 10, NOW + 1_000);

        assert_eq!(keys(&cache), vec!["a", "c", "b"]);

        // b is now the oldest and goes first
        cache.add("d".to_string(), 4, NOW + 1_000);
        assert!(!cache.contains("b"));
        assert!(cache.contains("a"));
    }

    #[test]
    fn test_store_overwrite_revives_expired_entry() {
        let mut cache = LruCache::new(10);

        cache.add("key".to_string(), 1, NOW - 10);
        assert!(cache.add("key".to_string(), 2, NOW + 1_000));

        assert_eq!(cache.get_at("key", NOW), Some(&2));
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut cache = LruCache::new(100);

        cache.add("key1".to_string(), 1, NOW + 1_000);

        // Should be accessible before the deadline
        assert_eq!(cache.get_at("key1", NOW + 1_000), Some(&1));

        // Expired once the clock moves past it
        assert_eq!(cache.get_at("key1", NOW + 1_001), None);
        assert!(cache.is_empty());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_store_expired_entry_is_purged_by_wall_clock_get() {
        let mut cache = LruCache::new(1);
        let now = millisecond_now();

        cache.add("x".to_string(), 1, now - 1);
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.get("x"), None);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_store_expired_entry_occupies_slot_until_touched() {
        let mut cache = LruCache::new(2);

        cache.add("stale".to_string(), 1, NOW - 1);
        cache.add("fresh".to_string(), 2, NOW + 1_000);

        // Nothing sweeps the stale entry
        assert_eq!(cache.len(), 2);
        assert!(cache.contains("stale"));

        // It is evicted as the least recently used entry, not for being expired
        cache.add("newer".to_string(), 3, NOW + 1_000);
        assert!(!cache.contains("stale"));
        assert_eq!(keys(&cache), vec!["newer", "fresh"]);
    }

    #[test]
    fn test_store_lru_evicts_unexpired_entry() {
        let mut cache = LruCache::new(2);

        cache.add("old".to_string(), 1, NOW + 1_000_000);
        cache.add("stale".to_string(), 2, NOW - 1);
        cache.add("new".to_string(), 3, NOW + 1_000);

        // Capacity eviction ignores expiration
        assert!(!cache.contains("old"));
        assert!(cache.contains("stale"));
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut cache = LruCache::new(3);

        cache.add("key1".to_string(), 1, NOW + 1_000);
        cache.add("key2".to_string(), 2, NOW + 1_000);
        cache.add("key3".to_string(), 3, NOW + 1_000);

        // Cache is full, adding key4 should evict key1 (oldest)
        cache.add("key4".to_string(), 4, NOW + 1_000);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get_at("key1", NOW), None);
        assert!(cache.get_at("key2", NOW).is_some());
        assert!(cache.get_at("key3", NOW).is_some());
        assert!(cache.get_at("key4", NOW).is_some());
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut cache = LruCache::new(2);

        cache.add("a".to_string(), 1, NOW + 1_000);
        cache.add("b".to_string(), 2, NOW + 1_000);

        // Access a to make it most recently used
        assert_eq!(cache.get_at("a", NOW), Some(&1));

        // Adding c should evict b (now oldest)
        cache.add("c".to_string(), 3, NOW + 1_000);

        assert_eq!(cache.get_at("b", NOW), None);
        assert_eq!(cache.get_at("a", NOW), Some(&1));
        assert_eq!(cache.get_at("c", NOW), Some(&3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_store_update_expiration() {
        let mut cache = LruCache::new(10);

        cache.add("a".to_string(), 1, NOW - 1);
        cache.add("b".to_string(), 2, NOW + 1_000);

        assert!(cache.update_expiration("a", NOW + 5_000));

        // Recency is unchanged, value still readable
        assert_eq!(keys(&cache), vec!["b", "a"]);
        assert_eq!(cache.get_at("a", NOW), Some(&1));
    }

    #[test]
    fn test_store_update_expiration_can_expire_entry() {
        let mut cache = LruCache::new(10);

        cache.add("a".to_string(), 1, NOW + 1_000);
        assert!(cache.update_expiration("a", NOW - 1));

        assert_eq!(cache.get_at("a", NOW), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_store_update_expiration_absent_key() {
        let mut cache = LruCache::new(10);

        cache.add("a".to_string(), 1, NOW + 1_000);
        cache.add("b".to_string(), 2, NOW + 1_000);

        assert!(!cache.update_expiration("missing", NOW + 5_000));

        assert_eq!(cache.len(), 2);
        assert_eq!(keys(&cache), vec!["b", "a"]);
        assert_eq!(cache.stats(), CacheStats::new());
    }

    #[test]
    fn test_store_stats_only_count_gets() {
        let mut cache = LruCache::new(100);

        cache.add("key1".to_string(), 1, NOW + 1_000);
        cache.get_at("key1", NOW); // hit
        cache.get_at("nonexistent", NOW); // miss
        cache.update_expiration("key1", NOW + 2_000);
        cache.remove("key1");
        cache.get_at("key1", NOW); // miss

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn test_store_capacity_one() {
        let mut cache = LruCache::new(1);

        cache.add("a".to_string(), 1, NOW + 1_000);
        cache.add("b".to_string(), 2, NOW + 1_000);

        assert_eq!(cache.len(), 1);
        assert_eq!(keys(&cache), vec!["b"]);
    }

    #[test]
    fn test_store_reuses_slots_after_churn() {
        let mut cache = LruCache::new(4);

        for i in 0..100 {
            cache.add(i, i * 10, NOW + 1_000);
        }

        assert_eq!(cache.len(), 4);
        let remaining: Vec<i32> = cache.keys().copied().collect();
        assert_eq!(remaining, vec![99, 98, 97, 96]);
        assert_eq!(cache.get_at(&97, NOW), Some(&970));
    }
}
