//! Directory-backed file store.
//!
//! Layout under the store root:
//!
//! ```text
//! index.json          folder tree and file metadata
//! objects/<file id>   file content
//! ```
//!
//! Every mutation rewrites the affected file through a temporary file and an
//! atomic rename, so a crash leaves either the old or the new version.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use cellref_types::FileId;

use crate::error::{StoreError, StoreResult};
use crate::traits::{FileInfo, FileStore, FolderId, NewFile};

const INDEX_FILE: &str = "index.json";
const OBJECTS_DIR: &str = "objects";

#[derive(Clone, Debug, Serialize, Deserialize)]
struct FolderEntry {
    name: String,
    parent: Option<FolderId>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Index {
    root: FolderId,
    folders: BTreeMap<FolderId, FolderEntry>,
    files: BTreeMap<FileId, FileInfo>,
}

impl Index {
    fn new(root_name: &str) -> Self {
        let root = FolderId::new(FileId::generate().into_string());
        let mut folders = BTreeMap::new();
        folders.insert(
            root.clone(),
            FolderEntry {
                name: root_name.to_string(),
                parent: None,
            },
        );
        Self {
            root,
            folders,
            files: BTreeMap::new(),
        }
    }
}

/// A [`FileStore`] persisted in a local directory.
#[derive(Debug)]
pub struct LocalFileStore {
    dir: PathBuf,
    index: RwLock<Index>,
}

impl LocalFileStore {
    /// Open the store at `dir`, creating it with a root folder named
    /// `root_name` if it does not exist yet.
    pub fn open(dir: impl AsRef<Path>, root_name: &str) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(dir.join(OBJECTS_DIR))?;
        let index_path = dir.join(INDEX_FILE);
        let index = if index_path.exists() {
            let raw = fs::read_to_string(&index_path)?;
            serde_json::from_str(&raw).map_err(|e| StoreError::Serialization(e.to_string()))?
        } else {
            let index = Index::new(root_name);
            write_atomic(&dir, &index_path, &encode_index(&index)?)?;
            index
        };
        debug!(dir = %dir.display(), "opened local file store");
        Ok(Self {
            dir,
            index: RwLock::new(index),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn object_path(&self, id: &FileId) -> PathBuf {
        self.dir.join(OBJECTS_DIR).join(id.as_str())
    }

    fn persist(&self, index: &Index) -> StoreResult<()> {
        write_atomic(&self.dir, &self.dir.join(INDEX_FILE), &encode_index(index)?)
    }

    fn read_index(&self) -> StoreResult<RwLockReadGuard<'_, Index>> {
        self.index
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write_index(&self) -> StoreResult<RwLockWriteGuard<'_, Index>> {
        self.index
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl FileStore for LocalFileStore {
    fn root(&self) -> StoreResult<FolderId> {
        Ok(self.read_index()?.root.clone())
    }

    fn find_folder(&self, parent: &FolderId, name: &str) -> StoreResult<Option<FolderId>> {
        let index = self.read_index()?;
        Ok(index
            .folders
            .iter()
            .find(|(_, f)| f.parent.as_ref() == Some(parent) && f.name == name)
            .map(|(id, _)| id.clone()))
    }

    fn create_folder(&self, parent: &FolderId, name: &str) -> StoreResult<FolderId> {
        let mut index = self.write_index()?;
        if !index.folders.contains_key(parent) {
            return Err(StoreError::NotFound {
                locator: parent.to_string(),
            });
        }
        let id = FolderId::new(FileId::generate().into_string());
        let mut next = index.clone();
        next.folders.insert(
            id.clone(),
            FolderEntry {
                name: name.to_string(),
                parent: Some(parent.clone()),
            },
        );
        self.persist(&next)?;
        *index = next;
        Ok(id)
    }

    fn create_file(&self, folder: &FolderId, file: NewFile<'_>) -> StoreResult<FileId> {
        let mut index = self.write_index()?;
        if !index.folders.contains_key(folder) {
            return Err(StoreError::NotFound {
                locator: folder.to_string(),
            });
        }
        let mut id = FileId::generate();
        while index.files.contains_key(&id) {
            id = FileId::generate();
        }
        write_atomic(&self.dir, &self.object_path(&id), file.content.as_bytes())?;
        let now = Utc::now();
        let mut next = index.clone();
        next.files.insert(
            id.clone(),
            FileInfo {
                id: id.clone(),
                name: file.name.to_string(),
                mime_type: file.mime_type.to_string(),
                folder: folder.clone(),
                size: file.content.len() as u64,
                sharing: file.sharing,
                created: now,
                updated: now,
            },
        );
        self.persist(&next)?;
        *index = next;
        Ok(id)
    }

    fn read_file(&self, id: &FileId) -> StoreResult<Option<String>> {
        if !self.read_index()?.files.contains_key(id) {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(self.object_path(id))?))
    }

    fn write_file(&self, id: &FileId, content: &str) -> StoreResult<bool> {
        let mut index = self.write_index()?;
        let mut next = index.clone();
        let Some(info) = next.files.get_mut(id) else {
            return Ok(false);
        };
        info.size = content.len() as u64;
        info.updated = Utc::now();
        write_atomic(&self.dir, &self.object_path(id), content.as_bytes())?;
        self.persist(&next)?;
        *index = next;
        Ok(true)
    }

    fn file_info(&self, id: &FileId) -> StoreResult<Option<FileInfo>> {
        Ok(self.read_index()?.files.get(id).cloned())
    }
}

fn encode_index(index: &Index) -> StoreResult<Vec<u8>> {
    serde_json::to_vec_pretty(index).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn write_atomic(dir: &Path, target: &Path, data: &[u8]) -> StoreResult<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(target).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}
