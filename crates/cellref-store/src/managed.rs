//! Content adapter over the managed file store.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use cellref_types::{EditorConfig, EditorKind, FileId};

use crate::error::{StoreError, StoreResult};
use crate::traits::{ContentStore, FileInfo, FileStore, FolderId, NewFile, ObjectMetadata, StoreKind};

/// Reads and writes editor content as files in the managed store.
///
/// New files go into `<project> Content/<Category>` under the project root,
/// named `<row key>--<field>.<ext>`.
#[derive(Clone)]
pub struct ManagedStore {
    files: Arc<dyn FileStore>,
    editor: &'static EditorConfig,
    project_name: String,
}

impl ManagedStore {
    pub fn new(files: Arc<dyn FileStore>, editor: EditorKind, project_name: impl Into<String>) -> Self {
        Self {
            files,
            editor: editor.config(),
            project_name: project_name.into(),
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Folder path for a category, relative to the project root.
    pub fn content_folder_path(&self, category: &str) -> String {
        format!("{} Content/{}", self.project_name, capitalize(category))
    }

    /// Resolve (creating if needed) the content folder for a category.
    pub fn content_folder(&self, category: &str) -> StoreResult<FolderId> {
        let root = self.files.root()?;
        self.files
            .folder_by_path(&root, &self.content_folder_path(category))
    }

    /// Metadata for a stored file.
    pub fn info(&self, locator: &str) -> StoreResult<FileInfo> {
        let id = parse_locator(locator)?;
        self.files
            .file_info(&id)?
            .ok_or_else(|| StoreError::NotFound {
                locator: locator.to_string(),
            })
    }
}

#[async_trait]
impl ContentStore for ManagedStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Managed
    }

    async fn read(&self, locator: &str) -> StoreResult<String> {
        let id = parse_locator(locator)?;
        let content = self
            .files
            .read_file(&id)?
            .ok_or_else(|| StoreError::NotFound {
                locator: locator.to_string(),
            })?;
        debug!(id = %id, bytes = content.len(), "read managed file");
        Ok(content)
    }

    async fn create(&self, content: &str, metadata: &ObjectMetadata) -> StoreResult<String> {
        let folder = self.content_folder(&metadata.category)?;
        let name = format!("{}.{}", metadata.file_stem(), self.editor.file_ext);
        let id = self.files.create_file(
            &folder,
            NewFile {
                name: &name,
                mime_type: self.editor.mime_type,
                content,
                sharing: metadata.sharing,
            },
        )?;
        info!(id = %id, name = %name, folder = %folder, "created managed file");
        Ok(id.into_string())
    }

    async fn update(&self, locator: &str, content: &str) -> StoreResult<()> {
        let id = parse_locator(locator)?;
        if !self.files.write_file(&id, content)? {
            return Err(StoreError::NotFound {
                locator: locator.to_string(),
            });
        }
        info!(id = %id, bytes = content.len(), "updated managed file");
        Ok(())
    }
}

fn parse_locator(locator: &str) -> StoreResult<FileId> {
    FileId::parse(locator).map_err(|e| StoreError::InvalidLocator {
        locator: locator.to_string(),
        reason: e.to_string(),
    })
}

/// Upper-case the first character, leaving the rest as-is.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
