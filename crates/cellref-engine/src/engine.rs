use std::sync::Arc;

use tracing::warn;

use cellref_cache::ContentCache;
use cellref_config::EngineConfig;
use cellref_types::{ContentRecord, EditorKind, SetMode};

use crate::committer::{CommitSettings, ContentCommitter};
use crate::context::{Backends, DocumentContext};
use crate::error::EngineResult;
use crate::resolver::ContentResolver;
use crate::sheet::Sheet;

/// The two entry points an editor calls: [`load`](Self::load) and
/// [`save`](Self::save), both against the sheet's active cell.
pub struct ContentEngine {
    editor: EditorKind,
    sheet: Arc<dyn Sheet>,
    resolver: ContentResolver,
    committer: ContentCommitter,
}

impl ContentEngine {
    pub fn new(
        editor: EditorKind,
        config: &EngineConfig,
        document: DocumentContext,
        backends: Backends,
        sheet: Arc<dyn Sheet>,
    ) -> Self {
        let urls = config.managed_urls();
        let cache = ContentCache::with_ttl(document.cache.clone(), config.content_ttl());
        let resolver = ContentResolver::new(editor, urls.clone(), cache.clone(), &backends);
        let committer = ContentCommitter::new(
            editor,
            CommitSettings {
                urls,
                project_name: config.project_name.clone(),
                webhook_url: config.webhook_url.clone(),
                sharing: config.default_sharing,
            },
            cache,
            document,
            backends,
            sheet.clone(),
        );
        Self {
            editor,
            sheet,
            resolver,
            committer,
        }
    }

    pub fn editor(&self) -> EditorKind {
        self.editor
    }

    pub fn resolver(&self) -> &ContentResolver {
        &self.resolver
    }

    /// Resolve the active cell into a record.
    pub async fn load(&self) -> EngineResult<ContentRecord> {
        let raw = self.sheet.read_active()?;
        self.resolver.resolve(&raw).await.inspect_err(|e| {
            warn!(editor = %self.editor, kind = %e.kind(), error = %e, "load failed");
        })
    }

    /// Commit `content` and re-encode the active cell.
    pub async fn save(
        &self,
        content: &str,
        mode: SetMode,
        existing: &ContentRecord,
    ) -> EngineResult<ContentRecord> {
        self.committer
            .save(content, mode, existing)
            .await
            .inspect_err(|e| {
                warn!(editor = %self.editor, %mode, kind = %e.kind(), error = %e, "save failed");
            })
    }
}
