//! Cache layer for resolved cell content.
//!
//! Managed-store and remote reads are expensive, so the resolver fronts them
//! with a short-TTL key/value cache scoped to one document.
//!
//! # Design Rules
//!
//! 1. Keys are deterministic: remote URLs are hashed to a fixed-length digest,
//!    managed file ids are used as-is.
//! 2. Keys are namespaced per editor and per purpose so unrelated subsystems
//!    can share one cache instance.
//! 3. Failed fetches are never cached.
//! 4. Single-flight is not guaranteed: concurrent misses on the same key may
//!    both fetch. Fetches are idempotent, so this only costs a request.
//! 5. Entries expire after their TTL; writers invalidate explicitly.

pub mod error;
pub mod key;
pub mod layer;
pub mod memory;
pub mod traits;

pub use error::{CacheError, CacheResult};
pub use key::{CacheKey, CachePurpose, KeyHasher};
pub use layer::{ContentCache, DEFAULT_CONTENT_TTL};
pub use memory::{CacheEntry, InMemoryCache};
pub use traits::CacheStore;
