//! Bounded in-memory TTL cache.
#![allow(dead_code)]
//!
//! Explicitly constructed and injected into its callers — no module-global
//! map. Capacity is bounded with LRU eviction; since every entry shares one
//! TTL, insertion order tracks expiry order, so the LRU victim is also the
//! entry closest to expiring. Expired entries are dropped lazily on lookup.
//!
//! Time comes from `tokio::time::Instant` so tests can drive expiry with a
//! paused clock.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use lru::LruCache;
use tokio::time::Instant;

/// Default freshness window for upstream query results.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

struct Entry<V> {
    data: V,
    expires_at: Instant,
}

pub struct TtlCache<K: Hash + Eq, V: Clone> {
    entries: Mutex<LruCache<K, Entry<V>>>,
    ttl: Duration,
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Returns the cached value if it is still fresh. Expired entries are
    /// removed and reported as absent.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let expired = match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => {
                return Some(entry.data.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    /// Stores a value with a fresh TTL, replacing any previous entry for the
    /// key. May evict the least-recently-used entry if at capacity.
    pub fn insert(&self, key: K, data: V) {
        let entry = Entry {
            data,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(key, entry);
    }

    pub fn remove(&self, key: &K) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop(key)
            .is_some()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
