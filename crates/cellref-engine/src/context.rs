use std::sync::Arc;

use cellref_cache::{CacheStore, InMemoryCache};
use cellref_config::{InMemoryPropertyStore, PropertyStore, PROJECT_NAME, WEBHOOK_URL};
use cellref_store::FileStore;
use cellref_webhook::HttpTransport;

use crate::error::EngineResult;

/// Per-document state threaded into the resolver and committer.
///
/// The cache and the property store are scoped to one document and shared
/// by every editor open on it.
#[derive(Clone)]
pub struct DocumentContext {
    pub cache: Arc<dyn CacheStore>,
    pub properties: Arc<dyn PropertyStore>,
}

impl DocumentContext {
    pub fn new(cache: Arc<dyn CacheStore>, properties: Arc<dyn PropertyStore>) -> Self {
        Self { cache, properties }
    }

    /// A fresh in-memory cache and property store.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryCache::new()),
            Arc::new(InMemoryPropertyStore::new()),
        )
    }

    /// The document's webhook URL, falling back to `fallback`.
    pub fn webhook_url(&self, fallback: Option<&str>) -> EngineResult<Option<String>> {
        Ok(self
            .properties
            .get_non_empty(WEBHOOK_URL)?
            .or_else(|| fallback.map(str::to_string)))
    }

    /// The document's project name, falling back to `fallback`.
    pub fn project_name(&self, fallback: &str) -> EngineResult<String> {
        Ok(self
            .properties
            .get_non_empty(PROJECT_NAME)?
            .unwrap_or_else(|| fallback.to_string()))
    }
}

/// External collaborators that hold content.
#[derive(Clone)]
pub struct Backends {
    pub files: Arc<dyn FileStore>,
    pub transport: Arc<dyn HttpTransport>,
}

impl Backends {
    pub fn new(files: Arc<dyn FileStore>, transport: Arc<dyn HttpTransport>) -> Self {
        Self { files, transport }
    }
}
