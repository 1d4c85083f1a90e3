use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cellref_types::{FileId, SharingPolicy};

use crate::error::StoreResult;

/// Which store a locator belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    Inline,
    Managed,
    Remote,
}

impl StoreKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKind::Inline => "inline",
            StoreKind::Managed => "managed",
            StoreKind::Remote => "remote",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context describing where a newly created object belongs.
///
/// Derived from the active cell: the sheet name is the category, the row's
/// key column and the column header name the object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub category: String,
    pub row_key: String,
    pub field: String,
    pub sharing: SharingPolicy,
}

impl ObjectMetadata {
    /// File name without extension: `<row_key>--<field>`.
    pub fn file_stem(&self) -> String {
        format!("{}--{}", self.row_key, self.field)
    }
}

/// A store that content can be read from and written to by locator.
///
/// Every call resolves to exactly one `Ok` or `Err`.
#[async_trait]
pub trait ContentStore: Send + Sync {
    fn kind(&self) -> StoreKind;

    /// Read the full content at `locator`.
    async fn read(&self, locator: &str) -> StoreResult<String>;

    /// Create a new object and return its locator.
    async fn create(&self, content: &str, metadata: &ObjectMetadata) -> StoreResult<String>;

    /// Overwrite the object at `locator`.
    async fn update(&self, locator: &str, content: &str) -> StoreResult<()>;
}

/// Opaque identifier of a folder in the file store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(pub String);

impl FolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file to be created.
#[derive(Clone, Copy, Debug)]
pub struct NewFile<'a> {
    pub name: &'a str,
    pub mime_type: &'a str,
    pub content: &'a str,
    pub sharing: SharingPolicy,
}

/// Metadata about a stored file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub id: FileId,
    pub name: String,
    pub mime_type: String,
    pub folder: FolderId,
    pub size: u64,
    pub sharing: SharingPolicy,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// The managed file store collaborator.
///
/// Folders form a tree under a project root. Files are addressed by
/// [`FileId`]. Implementations must be thread-safe.
pub trait FileStore: Send + Sync {
    /// The project root folder.
    fn root(&self) -> StoreResult<FolderId>;

    /// Find a direct child folder by exact name.
    fn find_folder(&self, parent: &FolderId, name: &str) -> StoreResult<Option<FolderId>>;

    /// Create a child folder. Does not check for an existing folder.
    fn create_folder(&self, parent: &FolderId, name: &str) -> StoreResult<FolderId>;

    /// Create a file in `folder` and return its new id.
    fn create_file(&self, folder: &FolderId, file: NewFile<'_>) -> StoreResult<FileId>;

    /// Read a file's text content. `Ok(None)` if the file does not exist.
    fn read_file(&self, id: &FileId) -> StoreResult<Option<String>>;

    /// Overwrite a file's content. Returns `false` if the file does not exist.
    fn write_file(&self, id: &FileId, content: &str) -> StoreResult<bool>;

    /// File metadata. `Ok(None)` if the file does not exist.
    fn file_info(&self, id: &FileId) -> StoreResult<Option<FileInfo>>;

    /// Resolve a `/`-separated folder path under `parent`, creating missing
    /// segments. Segments are trimmed; empty segments are skipped.
    fn folder_by_path(&self, parent: &FolderId, path: &str) -> StoreResult<FolderId> {
        let mut current = parent.clone();
        for segment in path.split('/').map(str::trim).filter(|s| !s.is_empty()) {
            current = match self.find_folder(&current, segment)? {
                Some(existing) => existing,
                None => self.create_folder(&current, segment)?,
            };
        }
        Ok(current)
    }
}
