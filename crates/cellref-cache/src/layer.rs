use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::{CacheError, CacheResult};
use crate::key::CacheKey;
use crate::traits::CacheStore;

/// Default lifetime of cached content (6 hours).
pub const DEFAULT_CONTENT_TTL: Duration = Duration::from_secs(21_600);

/// Read-through cache for pointer content.
#[derive(Clone)]
pub struct ContentCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ContentCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::with_ttl(store, DEFAULT_CONTENT_TTL)
    }

    pub fn with_ttl(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value for `key`, or run `fetch` and cache its result
    /// for the default TTL.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &CacheKey, fetch: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
        E: From<CacheError>,
    {
        self.get_or_fetch_with_ttl(key, self.ttl, fetch).await
    }

    /// Like [`get_or_fetch`](Self::get_or_fetch) with an explicit TTL.
    ///
    /// A failed fetch is returned as-is and leaves the cache untouched.
    pub async fn get_or_fetch_with_ttl<F, Fut, E>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        fetch: F,
    ) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
        E: From<CacheError>,
    {
        if let Some(hit) = self.store.get(key.as_str())? {
            debug!(key = %key, "cache hit");
            return Ok(hit);
        }
        debug!(key = %key, "cache miss");
        let value = fetch().await?;
        self.store.put(key.as_str(), &value, ttl)?;
        Ok(value)
    }

    /// Drop the entry for `key`. Returns `true` if a live entry was removed.
    pub fn invalidate(&self, key: &CacheKey) -> CacheResult<bool> {
        let removed = self.store.remove(key.as_str())?;
        debug!(key = %key, removed, "cache invalidated");
        Ok(removed)
    }

    /// Peek without fetching.
    pub fn peek(&self, key: &CacheKey) -> CacheResult<Option<String>> {
        self.store.get(key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::CachePurpose;
    use crate::memory::InMemoryCache;
    use cellref_types::EditorConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, thiserror::Error)]
    enum TestError {
        #[error("fetch failed")]
        Fetch,
        #[error(transparent)]
        Cache(#[from] CacheError),
    }

    fn key() -> CacheKey {
        CacheKey::remote(&EditorConfig::JSON, CachePurpose::Content, "https://e.co/a.json")
    }

    #[tokio::test]
    async fn second_call_is_a_hit() {
        let cache = ContentCache::new(Arc::new(InMemoryCache::new()));
        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            let value = cache
                .get_or_fetch(&key(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, TestError>("{\"a\":1}".to_string())
                })
                .await
                .unwrap();
            assert_eq!(value, "{\"a\":1}");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let cache = ContentCache::new(Arc::new(InMemoryCache::new()));
        let err = cache
            .get_or_fetch(&key(), || async { Err::<String, _>(TestError::Fetch) })
            .await
            .unwrap_err();
        assert!(matches!(err, TestError::Fetch));
        assert!(cache.peek(&key()).unwrap().is_none());

        let value = cache
            .get_or_fetch(&key(), || async { Ok::<_, TestError>("ok".to_string()) })
            .await
            .unwrap();
        assert_eq!(value, "ok");
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let cache = ContentCache::new(Arc::new(InMemoryCache::new()));
        cache
            .get_or_fetch(&key(), || async { Ok::<_, TestError>("old".to_string()) })
            .await
            .unwrap();
        assert!(cache.invalidate(&key()).unwrap());
        let value = cache
            .get_or_fetch(&key(), || async { Ok::<_, TestError>("new".to_string()) })
            .await
            .unwrap();
        assert_eq!(value, "new");
    }

    #[tokio::test]
    async fn expired_entries_refetch() {
        let cache = ContentCache::with_ttl(Arc::new(InMemoryCache::new()), Duration::ZERO);
        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            cache
                .get_or_fetch(&key(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, TestError>("v".to_string())
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn default_ttl_is_six_hours() {
        let cache = ContentCache::new(Arc::new(InMemoryCache::new()));
        assert_eq!(cache.ttl(), Duration::from_secs(6 * 60 * 60));
    }
}
