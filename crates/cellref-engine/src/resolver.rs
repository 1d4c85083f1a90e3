//! Load path: classify, then cache-or-fetch, then assemble a record.

use tracing::{debug, warn};

use cellref_cache::{CacheKey, CachePurpose, ContentCache};
use cellref_refs::{Classified, Classifier, ReferenceKind};
use cellref_store::{ContentStore, FileInfo, InlineStore, ManagedStore};
use cellref_types::{ContentRecord, EditorConfig, EditorKind, ManagedUrls};
use cellref_webhook::RemoteStore;

use crate::context::Backends;
use crate::error::{EngineError, EngineResult};

/// Resolves a cell reference into a [`ContentRecord`].
pub struct ContentResolver {
    classifier: Classifier,
    cache: ContentCache,
    inline: InlineStore,
    managed: ManagedStore,
    remote: RemoteStore,
}

impl ContentResolver {
    pub fn new(editor: EditorKind, urls: ManagedUrls, cache: ContentCache, backends: &Backends) -> Self {
        Self {
            classifier: Classifier::new(editor, urls),
            cache,
            inline: InlineStore,
            // Reads never need the project name or the webhook.
            managed: ManagedStore::new(backends.files.clone(), editor, ""),
            remote: RemoteStore::new(backends.transport.clone(), editor, None),
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    fn editor(&self) -> &'static EditorConfig {
        self.classifier.editor()
    }

    /// Resolve `raw`, the value of a cell.
    ///
    /// An empty cell yields the editor's empty default. Inline values are
    /// returned as-is without touching the cache. Pointers go through the
    /// cache; a failed read is not cached.
    pub async fn resolve(&self, raw: &str) -> EngineResult<ContentRecord> {
        let editor = self.editor();
        if raw.is_empty() {
            return Ok(ContentRecord::inline(editor.empty_content));
        }

        let classified = self.classifier.classify(raw)?;
        let kind = classified.kind;
        let (store, key): (&dyn ContentStore, CacheKey) = match kind {
            ReferenceKind::Inline => return self.resolve_inline(classified).await,
            ReferenceKind::ManagedPointer => (
                &self.managed as &dyn ContentStore,
                CacheKey::managed(editor, CachePurpose::Content, &classified.value),
            ),
            ReferenceKind::RemotePointer => (
                &self.remote as &dyn ContentStore,
                CacheKey::remote(editor, CachePurpose::Content, &classified.value),
            ),
        };

        let locator = classified.value.as_str();
        let content = self
            .cache
            .get_or_fetch(&key, || async move {
                store.read(locator).await.map_err(|e| {
                    warn!(store = %store.kind(), locator, error = %e, "content read failed");
                    EngineError::from(e)
                })
            })
            .await?;

        Ok(pointer_record(
            self.classifier.urls(),
            kind == ReferenceKind::ManagedPointer,
            locator,
            classified.auto_loaded,
            content,
        ))
    }

    async fn resolve_inline(&self, classified: Classified) -> EngineResult<ContentRecord> {
        let mut content = self.inline.read(&classified.value).await?;
        if content.is_empty() {
            content = self.editor().empty_content.to_string();
        }
        debug!(auto_loaded = classified.auto_loaded, "resolved inline content");
        Ok(ContentRecord::inline(content).with_auto_loaded(classified.auto_loaded))
    }

    /// Metadata of a managed file, cached under the metadata purpose.
    pub async fn managed_info(&self, id: &str) -> EngineResult<FileInfo> {
        let key = CacheKey::managed(self.editor(), CachePurpose::Metadata, id);
        let raw = self
            .cache
            .get_or_fetch(&key, || async {
                let info = self.managed.info(id)?;
                serde_json::to_string(&info).map_err(|e| EngineError::Internal(e.to_string()))
            })
            .await?;
        serde_json::from_str(&raw).map_err(|e| EngineError::Internal(format!("cached metadata for {id}: {e}")))
    }
}

/// Record for content behind a pointer.
///
/// Managed files get their canonical download and view URLs. Remote
/// pointers use the URL itself for both.
pub(crate) fn pointer_record(
    urls: &ManagedUrls,
    on_managed_store: bool,
    locator: &str,
    auto_loaded: bool,
    content: String,
) -> ContentRecord {
    let (source_url, view_url) = if on_managed_store {
        (urls.uc_url(locator), urls.view_url(locator))
    } else {
        (locator.to_string(), locator.to_string())
    };
    ContentRecord {
        source: Some(locator.to_string()),
        source_url: Some(source_url),
        view_url: Some(view_url),
        on_managed_store,
        auto_loaded,
        content,
    }
}
