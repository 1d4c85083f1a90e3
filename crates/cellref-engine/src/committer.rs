//! Save path: write to the chosen store, invalidate, re-encode, write the cell.

use std::sync::Arc;

use tracing::{debug, info, warn};

use cellref_cache::{CacheKey, CachePurpose, ContentCache};
use cellref_refs::{encode_reference, Classifier, ReferenceKind};
use cellref_store::{ContentStore, InlineStore, ManagedStore, ObjectMetadata, StoreError};
use cellref_types::{ContentRecord, EditorConfig, EditorKind, ManagedUrls, SetMode, SharingPolicy};
use cellref_webhook::RemoteStore;

use crate::context::{Backends, DocumentContext};
use crate::error::{EngineError, EngineResult};
use crate::resolver::pointer_record;
use crate::sheet::Sheet;

/// Settings the committer reads on every save.
#[derive(Clone, Debug)]
pub struct CommitSettings {
    pub urls: ManagedUrls,
    /// Used when the document has no `PROJECT_NAME` property.
    pub project_name: String,
    /// Used when the document has no `WEBHOOK_URL` property.
    pub webhook_url: Option<String>,
    pub sharing: SharingPolicy,
}

/// Commits edited content according to a [`SetMode`].
pub struct ContentCommitter {
    editor: EditorKind,
    settings: CommitSettings,
    cache: ContentCache,
    document: DocumentContext,
    backends: Backends,
    sheet: Arc<dyn Sheet>,
}

impl ContentCommitter {
    pub fn new(
        editor: EditorKind,
        settings: CommitSettings,
        cache: ContentCache,
        document: DocumentContext,
        backends: Backends,
        sheet: Arc<dyn Sheet>,
    ) -> Self {
        Self {
            editor,
            settings,
            cache,
            document,
            backends,
            sheet,
        }
    }

    fn config(&self) -> &'static EditorConfig {
        self.editor.config()
    }

    fn classifier(&self) -> Classifier {
        Classifier::new(self.editor, self.settings.urls.clone())
    }

    /// Save `content` and return the record for the new cell value.
    ///
    /// `existing` is the record from the last successful load, or a default
    /// record if there was none. Preconditions are checked before anything is
    /// written. The cache is invalidated only after the store write succeeds,
    /// and the cell is written only if its value changes.
    pub async fn save(
        &self,
        content: &str,
        mode: SetMode,
        existing: &ContentRecord,
    ) -> EngineResult<ContentRecord> {
        debug!(editor = %self.editor, %mode, "saving content");
        let (record, cell_value) = match mode {
            SetMode::Raw => self.save_raw(content).await?,
            SetMode::Current => self.save_current(content, existing).await?,
            SetMode::NewInternal => self.save_new_internal(content, existing).await?,
            SetMode::NewExternal => self.save_new_external(content, existing).await?,
        };
        self.write_cell(&cell_value)?;
        Ok(record)
    }

    async fn save_raw(&self, content: &str) -> EngineResult<(ContentRecord, String)> {
        let literal = self.raw_literal(content)?;
        InlineStore.update(literal, literal).await?;
        Ok((ContentRecord::inline(literal), literal.to_string()))
    }

    /// The form of `content` that loads back as the same inline value.
    ///
    /// Content that already classifies as an untagged inline literal is kept
    /// as-is; otherwise surrounding whitespace is dropped and it is tried
    /// again. Content that would read back as a pointer, a tagged value or an
    /// invalid reference is refused before the cell is touched.
    fn raw_literal<'a>(&self, content: &'a str) -> EngineResult<&'a str> {
        let classifier = self.classifier();
        for candidate in [content, content.trim()] {
            if let Ok(c) = classifier.classify(candidate) {
                if c.kind == ReferenceKind::Inline && !c.auto_loaded {
                    return Ok(candidate);
                }
            }
        }
        let delimiters = self
            .config()
            .inline_delimiters
            .iter()
            .map(|(open, close)| format!("{open}...{close}"))
            .collect::<Vec<_>>()
            .join(" or ");
        Err(EngineError::MalformedContent {
            editor: self.editor,
            reason: format!("raw content must be empty or wrapped as {delimiters}"),
        })
    }

    async fn save_current(
        &self,
        content: &str,
        existing: &ContentRecord,
    ) -> EngineResult<(ContentRecord, String)> {
        let source = existing
            .source
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                EngineError::InvalidOperation("CURRENT save needs an existing source".into())
            })?;

        if existing.on_managed_store {
            let store = self.managed_store()?;
            self.write_through(&store, source, content).await?;
            self.invalidate(ReferenceKind::ManagedPointer, source)?;
        } else {
            let store = self.remote_store()?;
            store.require_webhook()?;
            self.write_through(&store, source, content).await?;
            self.invalidate(ReferenceKind::RemotePointer, source)?;
        }

        Ok(self.pointer_result(
            existing.on_managed_store,
            source,
            existing.auto_loaded,
            content,
        ))
    }

    async fn save_new_internal(
        &self,
        content: &str,
        existing: &ContentRecord,
    ) -> EngineResult<(ContentRecord, String)> {
        let metadata = self.object_metadata()?;
        let store = self.managed_store()?;
        let id = store.create(content, &metadata).await.inspect_err(|e| {
            warn!(store = "managed", error = %e, "create failed");
        })?;
        Ok(self.pointer_result(true, &id, existing.auto_loaded, content))
    }

    async fn save_new_external(
        &self,
        content: &str,
        existing: &ContentRecord,
    ) -> EngineResult<(ContentRecord, String)> {
        let store = self.remote_store()?;
        store.require_webhook()?;
        let metadata = self.object_metadata()?;
        let url = store.create(content, &metadata).await?;

        // The relay may hand back a managed-store URL; the cell must reload
        // from whichever store the URL classifies as.
        let located = self.classifier().classify(&url)?;
        if !located.kind.is_pointer() {
            return Err(StoreError::NoWebhookResponse {
                reason: format!("response url {url:?} is not a pointer"),
            }
            .into());
        }
        debug!(kind = ?located.kind, "located new external content");
        Ok(self.pointer_result(
            located.kind == ReferenceKind::ManagedPointer,
            &located.value,
            existing.auto_loaded,
            content,
        ))
    }

    async fn write_through(
        &self,
        store: &dyn ContentStore,
        locator: &str,
        content: &str,
    ) -> EngineResult<()> {
        store.update(locator, content).await.map_err(|e| {
            warn!(store = %store.kind(), locator, error = %e, "update failed");
            EngineError::from(e)
        })
    }

    fn invalidate(&self, kind: ReferenceKind, locator: &str) -> EngineResult<()> {
        let editor = self.config();
        if let Some(key) = CacheKey::build(editor, CachePurpose::Content, kind, locator) {
            self.cache.invalidate(&key)?;
        }
        if kind == ReferenceKind::ManagedPointer {
            self.cache
                .invalidate(&CacheKey::managed(editor, CachePurpose::Metadata, locator))?;
        }
        Ok(())
    }

    fn pointer_result(
        &self,
        on_managed_store: bool,
        locator: &str,
        auto_loaded: bool,
        content: &str,
    ) -> (ContentRecord, String) {
        let encoded = encode_reference(
            self.config(),
            &self.settings.urls,
            locator,
            on_managed_store,
            auto_loaded,
        );
        let record = pointer_record(
            &self.settings.urls,
            on_managed_store,
            locator,
            auto_loaded,
            content.to_string(),
        );
        (record, encoded)
    }

    fn write_cell(&self, value: &str) -> EngineResult<()> {
        if self.sheet.read_active()? == value {
            debug!("cell unchanged, skipping write");
            return Ok(());
        }
        self.sheet.write_active(value)?;
        info!(bytes = value.len(), "cell reference written");
        Ok(())
    }

    fn object_metadata(&self) -> EngineResult<ObjectMetadata> {
        let cell = self.sheet.active_context()?;
        Ok(ObjectMetadata {
            category: cell.sheet,
            row_key: cell.key,
            field: cell.field,
            sharing: self.settings.sharing,
        })
    }

    fn managed_store(&self) -> EngineResult<ManagedStore> {
        let project = self.document.project_name(&self.settings.project_name)?;
        Ok(ManagedStore::new(self.backends.files.clone(), self.editor, project))
    }

    fn remote_store(&self) -> EngineResult<RemoteStore> {
        let hook = self
            .document
            .webhook_url(self.settings.webhook_url.as_deref())?;
        Ok(RemoteStore::new(self.backends.transport.clone(), self.editor, hook))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use cellref_cache::InMemoryCache;
    use cellref_config::WEBHOOK_URL;
    use cellref_store::InMemoryFileStore;
    use cellref_webhook::RecordingTransport;

    use crate::sheet::InMemorySheet;
    use crate::ErrorKind;

    const HOOK: &str = "https://hooks.example.com/content";

    struct Fixture {
        files: Arc<InMemoryFileStore>,
        transport: Arc<RecordingTransport>,
        sheet: Arc<InMemorySheet>,
        document: DocumentContext,
        committer: ContentCommitter,
    }

    fn fixture(cell: &str, webhook: Option<&str>) -> Fixture {
        let files = Arc::new(InMemoryFileStore::new("Demo"));
        let transport = Arc::new(RecordingTransport::new());
        let sheet = Arc::new(InMemorySheet::single_cell("posts", "first", "body", cell));
        let document = DocumentContext::in_memory();
        let committer = ContentCommitter::new(
            EditorKind::Json,
            CommitSettings {
                urls: ManagedUrls::default(),
                project_name: "Demo".into(),
                webhook_url: webhook.map(str::to_string),
                sharing: SharingPolicy::Public,
            },
            ContentCache::new(Arc::new(InMemoryCache::new())),
            document.clone(),
            Backends::new(files.clone(), transport.clone()),
            sheet.clone(),
        );
        Fixture {
            files,
            transport,
            sheet,
            document,
            committer,
        }
    }

    #[tokio::test]
    async fn raw_writes_content_into_cell() {
        let f = fixture("", None);
        let record = f
            .committer
            .save("{\"a\":1}", SetMode::Raw, &ContentRecord::default())
            .await
            .unwrap();
        assert_eq!(f.sheet.read_active().unwrap(), "{\"a\":1}");
        assert_eq!(record, ContentRecord::inline("{\"a\":1}"));
        assert_eq!(f.files.write_count(), 0);
    }

    #[tokio::test]
    async fn raw_trims_whitespace_around_a_literal() {
        let f = fixture("", None);
        let record = f
            .committer
            .save("{\"a\":1}\n", SetMode::Raw, &ContentRecord::default())
            .await
            .unwrap();
        assert_eq!(record.content, "{\"a\":1}");
        assert_eq!(f.sheet.read_active().unwrap(), "{\"a\":1}");
    }

    #[tokio::test]
    async fn raw_refuses_content_that_would_not_reload_inline() {
        let id = "17wmkJn5wDY8o_91kYw72XLT_NdZS3u0W";
        for content in ["plain words", "https://cms.example.com/doc/1", id, "json://{}"] {
            let f = fixture("[1]", None);
            let err = f
                .committer
                .save(content, SetMode::Raw, &ContentRecord::default())
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedContent, "{content}");
            assert_eq!(f.sheet.write_count(), 0, "{content}");
            assert_eq!(f.sheet.read_active().unwrap(), "[1]");
        }
    }

    #[tokio::test]
    async fn unchanged_cell_is_not_rewritten() {
        let f = fixture("[1]", None);
        f.committer
            .save("[1]", SetMode::Raw, &ContentRecord::default())
            .await
            .unwrap();
        assert_eq!(f.sheet.write_count(), 0);
    }

    #[tokio::test]
    async fn new_internal_writes_canonical_url() {
        let f = fixture("", None);
        let record = f
            .committer
            .save("{\"b\":2}", SetMode::NewInternal, &ContentRecord::default())
            .await
            .unwrap();
        let id = record.source.clone().unwrap();
        assert!(record.on_managed_store);
        assert_eq!(f.files.file_count().unwrap(), 1);
        assert_eq!(f.sheet.read_active().unwrap(), ManagedUrls::default().uc_url(&id));
    }

    #[tokio::test]
    async fn new_internal_keeps_auto_load_tag() {
        let f = fixture("", None);
        let existing = ContentRecord::default().with_auto_loaded(true);
        let record = f
            .committer
            .save("{}", SetMode::NewInternal, &existing)
            .await
            .unwrap();
        let id = record.source.unwrap();
        assert_eq!(f.sheet.read_active().unwrap(), format!("json://{id}"));
    }

    #[tokio::test]
    async fn new_external_without_webhook_does_nothing() {
        let f = fixture("{}", None);
        let err = f
            .committer
            .save("{\"c\":3}", SetMode::NewExternal, &ContentRecord::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WebhookNotConfigured);
        assert_eq!(f.transport.call_count().unwrap(), 0);
        assert_eq!(f.sheet.write_count(), 0);
        assert_eq!(f.sheet.read_active().unwrap(), "{}");
    }

    #[tokio::test]
    async fn new_external_uses_document_webhook() {
        let f = fixture("", None);
        f.document.properties.set(WEBHOOK_URL, HOOK).unwrap();
        f.transport
            .respond_to_posts(r#"{"url":"https://cms.example.com/doc/1"}"#)
            .unwrap();
        let record = f
            .committer
            .save("{}", SetMode::NewExternal, &ContentRecord::default())
            .await
            .unwrap();
        assert_eq!(record.source.as_deref(), Some("https://cms.example.com/doc/1"));
        assert!(!record.on_managed_store);
        assert_eq!(f.sheet.read_active().unwrap(), "https://cms.example.com/doc/1");
        assert_eq!(f.transport.calls().unwrap()[0].url, HOOK);
    }

    #[tokio::test]
    async fn new_external_without_url_in_response_leaves_cell() {
        let f = fixture("{}", Some(HOOK));
        let err = f
            .committer
            .save("[]", SetMode::NewExternal, &ContentRecord::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoWebhookResponse);
        assert_eq!(f.sheet.write_count(), 0);
    }

    #[tokio::test]
    async fn new_external_relative_url_in_response_leaves_cell() {
        let f = fixture("{}", Some(HOOK));
        f.transport.respond_to_posts(r#"{"url":"doc-7"}"#).unwrap();
        let err = f
            .committer
            .save("[]", SetMode::NewExternal, &ContentRecord::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoWebhookResponse);
        assert_eq!(f.sheet.write_count(), 0);
    }

    #[tokio::test]
    async fn new_external_managed_url_is_recorded_as_managed() {
        let id = "17wmkJn5wDY8o_91kYw72XLT_NdZS3u0W";
        let urls = ManagedUrls::default();
        let f = fixture("", Some(HOOK));
        f.transport
            .respond_to_posts(&format!(r#"{{"url":"{}"}}"#, urls.uc_url(id)))
            .unwrap();
        let record = f
            .committer
            .save("{}", SetMode::NewExternal, &ContentRecord::default())
            .await
            .unwrap();
        assert!(record.on_managed_store);
        assert_eq!(record.source.as_deref(), Some(id));
        assert_eq!(f.sheet.read_active().unwrap(), urls.uc_url(id));
    }

    #[tokio::test]
    async fn current_without_source_is_invalid() {
        let f = fixture("", Some(HOOK));
        let err = f
            .committer
            .save("{}", SetMode::Current, &ContentRecord::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        assert_eq!(f.sheet.write_count(), 0);
    }

    #[tokio::test]
    async fn current_remote_without_webhook_fails_fast() {
        let f = fixture("https://cms.example.com/doc/1", None);
        let existing = ContentRecord {
            source: Some("https://cms.example.com/doc/1".into()),
            ..Default::default()
        };
        let err = f
            .committer
            .save("{}", SetMode::Current, &existing)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WebhookNotConfigured);
        assert_eq!(f.transport.call_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn current_remote_posts_update_and_keeps_locator() {
        let url = "https://cms.example.com/doc/1";
        let f = fixture(&format!("json://{url}"), Some(HOOK));
        let existing = ContentRecord {
            source: Some(url.into()),
            auto_loaded: true,
            ..Default::default()
        };
        let record = f
            .committer
            .save("{\"d\":4}", SetMode::Current, &existing)
            .await
            .unwrap();
        assert_eq!(record.source.as_deref(), Some(url));
        assert_eq!(f.sheet.write_count(), 0);
        let calls = f.transport.calls().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body.as_ref().unwrap()["resource"], url);
    }

    #[tokio::test]
    async fn current_managed_failure_keeps_cell() {
        let f = fixture("17wmkJn5wDY8o_91kYw72XLT_NdZS3u0W", None);
        let existing = ContentRecord {
            source: Some("17wmkJn5wDY8o_91kYw72XLT_NdZS3u0W".into()),
            on_managed_store: true,
            ..Default::default()
        };
        let err = f
            .committer
            .save("{}", SetMode::Current, &existing)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(f.sheet.write_count(), 0);
    }
}
