use std::time::Duration;

use crate::error::CacheResult;

/// Key/value store with per-entry expiry.
///
/// This is the only surface the engine needs from a document cache: get,
/// put with a TTL, and remove. Implementations must be `Send + Sync`; no
/// locking across calls is implied.
pub trait CacheStore: Send + Sync {
    /// Read a live entry. Expired entries read as `Ok(None)`.
    fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Insert or replace an entry that expires after `ttl`.
    fn put(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Remove an entry. Returns `true` if a live entry existed.
    fn remove(&self, key: &str) -> CacheResult<bool>;
}
