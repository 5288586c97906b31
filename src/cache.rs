//! A small in-process cache with per-entry expiry.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expire_at: DateTime<Utc>,
}

/// Key-value cache where every entry expires after a time-to-live.
///
/// Expired entries are invisible to readers immediately but only freed on the next
/// write to the same key or a call to [`TtlCache::purge_expired`]. All time-dependent
/// operations have an `_at` variant taking an explicit clock.
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, Entry<V>>,
}

impl<K: Eq + Hash, V> TtlCache<K, V> {
    /// Create an empty cache whose entries live for `ttl` by default.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_at(key, Utc::now())
    }

    pub fn get_at(&self, key: &K, now: DateTime<Utc>) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|entry| entry.expire_at > now)
            .map(|entry| &entry.value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.get_mut_at(key, Utc::now())
    }

    pub fn get_mut_at(&mut self, key: &K, now: DateTime<Utc>) -> Option<&mut V> {
        self.entries
            .get_mut(key)
            .filter(|entry| entry.expire_at > now)
            .map(|entry| &mut entry.value)
    }

    /// Insert with the default TTL, returning the live value previously stored, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.insert_at(key, value, Utc::now())
    }

    pub fn insert_at(&mut self, key: K, value: V, now: DateTime<Utc>) -> Option<V> {
        let ttl = self.ttl;
        self.insert_with_ttl_at(key, value, ttl, now)
    }

    pub fn insert_with_ttl(&mut self, key: K, value: V, ttl: Duration) -> Option<V> {
        self.insert_with_ttl_at(key, value, ttl, Utc::now())
    }

    pub fn insert_with_ttl_at(
        &mut self,
        key: K,
        value: V,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Option<V> {
        let entry = Entry {
            value,
            expire_at: now + ttl,
        };
        self.entries
            .insert(key, entry)
            .filter(|old| old.expire_at > now)
            .map(|old| old.value)
    }

    /// Remove an entry, returning its value if it had not yet expired.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_at(key, Utc::now())
    }

    pub fn remove_at(&mut self, key: &K, now: DateTime<Utc>) -> Option<V> {
        self.entries
            .remove(key)
            .filter(|entry| entry.expire_at > now)
            .map(|entry| entry.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop every expired entry, returning how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    pub fn purge_expired_at(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expire_at > now);
        before - self.entries.len()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
