/// Errors from cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A lock guarding the cache was poisoned by a panicking writer.
    #[error("cache lock poisoned: {0}")]
    LockPoisoned(String),

    /// The cache backend rejected or failed the operation.
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
