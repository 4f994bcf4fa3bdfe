//! TTL + LRU cache for localized content
//!
//! Entries expire after a fixed TTL. When the cache holds more entries than
//! `max_entries`, or its size estimate passes `max_memory_bytes`, the least
//! recently used entries are dropped first. Values are handed out as `Arc`s
//! so readers never hold the cache lock while rendering.

use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Approximate heap footprint, used for the memory budget
pub trait CacheWeight {
    fn estimated_size(&self) -> usize;
}

impl<T: CacheWeight> CacheWeight for Vec<T> {
    fn estimated_size(&self) -> usize {
        24 + self.iter().map(CacheWeight::estimated_size).sum::<usize>()
    }
}

/// Cache limits
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long an entry stays fresh
    pub ttl: Duration,
    /// Maximum number of entries
    pub max_entries: usize,
    /// Soft memory budget in bytes
    pub max_memory_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            max_entries: 50,
            max_memory_bytes: 5 * 1024 * 1024, // 5MB
        }
    }
}

/// Cache counters
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub memory_bytes: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheEntry<V> {
    value: Arc<V>,
    inserted_at: Instant,
    /// Access sequence number; lowest is least recently used
    last_access: u64,
    size: usize,
}

/// TTL cache with LRU eviction
pub struct ContentCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    config: CacheConfig,
    memory_bytes: usize,
    access_counter: u64,
    stats: CacheStats,
}

impl<K, V> ContentCache<K, V>
where
    K: Eq + Hash + Clone,
    V: CacheWeight,
{
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config,
            memory_bytes: 0,
            access_counter: 0,
            stats: CacheStats::default(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn next_access(&mut self) -> u64 {
        self.access_counter += 1;
        self.access_counter
    }

    /// Fresh value for `key`; expired entries are removed and count as a miss
    pub fn get(&mut self, key: &K) -> Option<Arc<V>> {
        let ttl = self.config.ttl;
        let expired = match self.entries.get(key) {
            Some(entry) => entry.inserted_at.elapsed() >= ttl,
            None => {
                self.stats.misses += 1;
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.expirations += 1;
            self.stats.misses += 1;
            return None;
        }

        let access = self.next_access();
        let entry = self.entries.get_mut(key)?;
        entry.last_access = access;
        self.stats.hits += 1;
        Some(Arc::clone(&entry.value))
    }

    /// Whether a fresh entry exists, without touching LRU order or counters
    pub fn contains_fresh(&self, key: &K) -> bool {
        self.entries
            .get(key)
            .map(|e| e.inserted_at.elapsed() < self.config.ttl)
            .unwrap_or(false)
    }

    /// Insert or replace a value, then enforce the limits
    pub fn insert(&mut self, key: K, value: V) -> Arc<V> {
        let size = value.estimated_size();
        let value = Arc::new(value);
        let access = self.next_access();

        self.remove_entry(&key);
        self.entries.insert(
            key,
            CacheEntry {
                value: Arc::clone(&value),
                inserted_at: Instant::now(),
                last_access: access,
                size,
            },
        );
        self.memory_bytes += size;

        self.enforce_limits();
        value
    }

    /// Drop one entry; returns whether it existed
    pub fn invalidate(&mut self, key: &K) -> bool {
        self.remove_entry(key)
    }

    /// Drop every entry whose key does not satisfy `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) -> usize {
        let doomed: Vec<K> = self
            .entries
            .keys()
            .filter(|k| !keep(k))
            .cloned()
            .collect();
        for key in &doomed {
            self.remove_entry(key);
        }
        doomed.len()
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.memory_bytes = 0;
    }

    /// Remove expired entries eagerly
    pub fn purge_expired(&mut self) -> usize {
        let ttl = self.config.ttl;
        let expired: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, e)| e.inserted_at.elapsed() >= ttl)
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired {
            self.remove_entry(key);
        }
        self.stats.expirations += expired.len() as u64;
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            memory_bytes: self.memory_bytes,
            ..self.stats.clone()
        }
    }

    fn remove_entry(&mut self, key: &K) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.memory_bytes = self.memory_bytes.saturating_sub(entry.size);
                true
            }
            None => false,
        }
    }

    fn enforce_limits(&mut self) {
        // A single oversized entry is kept; the budget only forces out others
        while self.entries.len() > self.config.max_entries
            || (self.memory_bytes > self.config.max_memory_bytes && self.entries.len() > 1)
        {
            let lru = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_access)
                .map(|(k, _)| k.clone());

            match lru {
                Some(key) => {
                    self.remove_entry(&key);
                    self.stats.evictions += 1;
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Blob(usize);

    impl CacheWeight for Blob {
        fn estimated_size(&self) -> usize {
            self.0
        }
    }

    fn config(max_entries: usize, max_memory_bytes: usize) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(300),
            max_entries,
            max_memory_bytes,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_and_expiry() {
        let mut cache = ContentCache::new(config(10, 10_000));
        cache.insert("ui:en", Blob(10));

        assert_eq!(cache.get(&"ui:en").as_deref(), Some(&Blob(10)));

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.get(&"ui:en").is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get(&"ui:en").is_none());
        assert!(cache.is_empty());

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.memory_bytes, 0);
    }

    #[tokio::test]
    async fn test_lru_eviction_by_count() {
        let mut cache = ContentCache::new(config(2, 10_000));
        cache.insert("a", Blob(1));
        cache.insert("b", Blob(1));

        // Touch "a" so "b" becomes least recently used
        assert!(cache.get(&"a").is_some());
        cache.insert("c", Blob(1));

        assert!(cache.contains_fresh(&"a"));
        assert!(!cache.contains_fresh(&"b"));
        assert!(cache.contains_fresh(&"c"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test]
    async fn test_lru_eviction_by_memory() {
        let mut cache = ContentCache::new(config(10, 100));
        cache.insert("a", Blob(40));
        cache.insert("b", Blob(40));
        cache.insert("c", Blob(40));

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains_fresh(&"a"));
        assert_eq!(cache.stats().memory_bytes, 80);
    }

    #[tokio::test]
    async fn test_oversized_entry_kept_alone() {
        let mut cache = ContentCache::new(config(10, 100));
        cache.insert("small", Blob(10));
        cache.insert("huge", Blob(500));

        assert_eq!(cache.len(), 1);
        assert!(cache.contains_fresh(&"huge"));
    }

    #[tokio::test]
    async fn test_replace_updates_memory() {
        let mut cache = ContentCache::new(config(10, 1000));
        cache.insert("a", Blob(100));
        cache.insert("a", Blob(30));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().memory_bytes, 30);
    }

    #[tokio::test]
    async fn test_invalidate_retain_clear() {
        let mut cache = ContentCache::new(config(10, 1000));
        cache.insert(("ui", "en"), Blob(1));
        cache.insert(("ui", "ar"), Blob(1));
        cache.insert(("question", "ar"), Blob(1));

        assert!(cache.invalidate(&("ui", "en")));
        assert!(!cache.invalidate(&("ui", "en")));

        let removed = cache.retain(|(_, lang)| *lang != "ar");
        assert_eq!(removed, 2);
        assert!(cache.is_empty());

        cache.insert(("ui", "en"), Blob(5));
        cache.clear();
        assert_eq!(cache.stats().memory_bytes, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let mut cache = ContentCache::new(config(10, 1000));
        cache.insert("old", Blob(1));
        tokio::time::advance(Duration::from_secs(200)).await;
        cache.insert("new", Blob(1));
        tokio::time::advance(Duration::from_secs(150)).await;

        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.contains_fresh(&"new"));
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert_eq!(stats.hit_rate(), 0.75);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
