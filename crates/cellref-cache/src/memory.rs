//! In-memory cache for tests and single-process embedding.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, CacheResult};
use crate::traits::CacheStore;

/// A cached value with its absolute expiry time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Build an entry that expires `ttl` after `now`.
    pub fn new(key: impl Into<String>, value: impl Into<String>, ttl: Duration, now: DateTime<Utc>) -> Self {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            key: key.into(),
            value: value.into(),
            expires_at,
        }
    }

    /// An entry is expired at or after its expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// `HashMap`-backed [`CacheStore`] behind a `RwLock`.
///
/// Expired entries are dropped lazily on read and by [`purge_expired`].
///
/// [`purge_expired`]: InMemoryCache::purge_expired
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> CacheResult<usize> {
        Ok(self.read_lock()?.len())
    }

    pub fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.read_lock()?.is_empty())
    }

    /// Drop every entry expired at `now`. Returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> CacheResult<usize> {
        let mut entries = self.write_lock()?;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        Ok(before - entries.len())
    }

    /// Snapshot of a stored entry, live or not.
    pub fn entry(&self, key: &str) -> CacheResult<Option<CacheEntry>> {
        Ok(self.read_lock()?.get(key).cloned())
    }

    /// Remove `key` only if it is still expired at `now`.
    ///
    /// A `put` may land between a read that saw an expired entry and this
    /// call, so expiry is checked again under the write lock.
    fn evict_if_expired(&self, key: &str, now: DateTime<Utc>) -> CacheResult<bool> {
        let mut entries = self.write_lock()?;
        if entries.get(key).is_some_and(|entry| entry.is_expired_at(now)) {
            entries.remove(key);
            return Ok(true);
        }
        Ok(false)
    }

    fn read_lock(&self) -> CacheResult<std::sync::RwLockReadGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries
            .read()
            .map_err(|e| CacheError::LockPoisoned(e.to_string()))
    }

    fn write_lock(&self) -> CacheResult<std::sync::RwLockWriteGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries
            .write()
            .map_err(|e| CacheError::LockPoisoned(e.to_string()))
    }
}

impl CacheStore for InMemoryCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Utc::now();
        {
            let entries = self.read_lock()?;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired_at(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }
        self.evict_if_expired(key, now)?;
        Ok(None)
    }

    fn put(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let entry = CacheEntry::new(key, value, ttl, Utc::now());
        self.write_lock()?.insert(key.to_string(), entry);
        Ok(())
    }

    fn remove(&self, key: &str) -> CacheResult<bool> {
        let now = Utc::now();
        Ok(self
            .write_lock()?
            .remove(key)
            .is_some_and(|entry| !entry.is_expired_at(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn put_then_get() {
        let cache = InMemoryCache::new();
        cache.put("k", "v", HOUR).unwrap();
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn missing_key_is_none() {
        let cache = InMemoryCache::new();
        assert!(cache.get("nope").unwrap().is_none());
    }

    #[test]
    fn put_replaces_existing_value() {
        let cache = InMemoryCache::new();
        cache.put("k", "old", HOUR).unwrap();
        cache.put("k", "new", HOUR).unwrap();
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("new"));
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let cache = InMemoryCache::new();
        cache.put("k", "v", Duration::ZERO).unwrap();
        assert!(cache.get("k").unwrap().is_none());
        // Expired entries are dropped on read.
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn remove_reports_live_entries() {
        let cache = InMemoryCache::new();
        cache.put("k", "v", HOUR).unwrap();
        assert!(cache.remove("k").unwrap());
        assert!(!cache.remove("k").unwrap());
        assert!(cache.get("k").unwrap().is_none());
    }

    #[test]
    fn entry_expiry_boundary() {
        let now = Utc::now();
        let entry = CacheEntry::new("k", "v", Duration::from_secs(60), now);
        assert!(!entry.is_expired_at(now));
        assert!(!entry.is_expired_at(now + chrono::Duration::seconds(59)));
        assert!(entry.is_expired_at(now + chrono::Duration::seconds(60)));
    }

    #[test]
    fn purge_drops_only_expired() {
        let cache = InMemoryCache::new();
        cache.put("short", "a", Duration::from_secs(1)).unwrap();
        cache.put("long", "b", HOUR).unwrap();
        let removed = cache
            .purge_expired(Utc::now() + chrono::Duration::seconds(5))
            .unwrap();
        assert_eq!(removed, 1);
        assert!(cache.entry("short").unwrap().is_none());
        assert!(cache.entry("long").unwrap().is_some());
    }

    #[test]
    fn eviction_spares_an_entry_refreshed_after_expiry() {
        let cache = InMemoryCache::new();
        cache.put("k", "stale", Duration::ZERO).unwrap();
        let seen_expired_at = Utc::now();
        cache.put("k", "fresh", HOUR).unwrap();

        assert!(!cache.evict_if_expired("k", seen_expired_at).unwrap());
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("fresh"));
    }

    #[test]
    fn eviction_removes_a_still_expired_entry() {
        let cache = InMemoryCache::new();
        cache.put("k", "stale", Duration::ZERO).unwrap();
        assert!(cache.evict_if_expired("k", Utc::now()).unwrap());
        assert!(cache.entry("k").unwrap().is_none());
    }

    #[test]
    fn huge_ttl_does_not_overflow() {
        let entry = CacheEntry::new("k", "v", Duration::from_secs(u64::MAX), Utc::now());
        assert!(!entry.is_expired_at(Utc::now()));
    }
}
