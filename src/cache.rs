//! In-memory response cache
//!
//! Bounded, time-to-live caches for cocktail lookups. Entries are replaced
//! wholesale on write and expire lazily: an expired entry is never returned,
//! but it is only dropped when it is next looked up or evicted for capacity.

use crate::directory::Cocktail;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// A cached result set with its creation time.
///
/// Records are shared behind an `Arc`, so readers get a consistent snapshot
/// even while a writer replaces the entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    cocktails: Arc<Vec<Cocktail>>,
    created_at: Instant,
    lifespan: Duration,
}

impl CacheEntry {
    /// Stamps `cocktails` with the current time.
    pub fn new(cocktails: Vec<Cocktail>, lifespan: Duration) -> Self {
        Self::created_at(cocktails, lifespan, Instant::now())
    }

    /// Builds an entry with an explicit creation time.
    pub fn created_at(cocktails: Vec<Cocktail>, lifespan: Duration, created_at: Instant) -> Self {
        Self {
            cocktails: Arc::new(cocktails),
            created_at,
            lifespan,
        }
    }

    /// Whether the entry has outlived its lifespan.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.lifespan
    }

    pub fn cocktails(&self) -> &[Cocktail] {
        &self.cocktails
    }

    /// Shared handle to the cached records.
    pub fn shared(&self) -> Arc<Vec<Cocktail>> {
        Arc::clone(&self.cocktails)
    }
}

/// Thread-safe, capacity-bounded TTL cache keyed by string.
///
/// Least recently used entries are evicted once `capacity` is exceeded.
pub struct ResponseCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    lifespan: Duration,
}

impl ResponseCache {
    /// Creates a cache holding at most `capacity` entries (minimum one).
    pub fn new(capacity: usize, lifespan: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            lifespan,
        }
    }

    /// Returns the entry for `key` if present and not expired.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let mut entries = self.lock_entries();
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.clone()),
            Some(_) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    /// Stores `cocktails` under `key`, replacing any previous entry.
    pub fn put(&self, key: impl Into<String>, cocktails: Vec<Cocktail>) {
        self.insert(key, CacheEntry::new(cocktails, self.lifespan));
    }

    /// Stores a prebuilt entry under `key`.
    pub fn insert(&self, key: impl Into<String>, entry: CacheEntry) {
        self.lock_entries().put(key.into(), entry);
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock_entries().cap().get()
    }

    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    /// Entries are only ever replaced whole, so a poisoned map is still
    /// consistent.
    fn lock_entries(&self) -> MutexGuard<'_, LruCache<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
