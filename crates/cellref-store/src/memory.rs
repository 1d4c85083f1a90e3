//! In-memory file store for tests and ephemeral use.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use cellref_types::{FileId, SharingPolicy};

use crate::error::{StoreError, StoreResult};
use crate::traits::{FileInfo, FileStore, FolderId, NewFile};

#[derive(Debug)]
struct Folder {
    name: String,
    parent: Option<FolderId>,
}

#[derive(Debug)]
struct StoredFile {
    info: FileInfo,
    content: String,
}

#[derive(Debug, Default)]
struct State {
    folders: HashMap<FolderId, Folder>,
    files: HashMap<FileId, StoredFile>,
    next_folder: u64,
}

/// An in-memory implementation of [`FileStore`].
///
/// Data lives in `HashMap`s behind a `RwLock` and is lost when the store is
/// dropped. Reads and writes are counted so tests can assert how often the
/// store was hit.
#[derive(Debug)]
pub struct InMemoryFileStore {
    state: RwLock<State>,
    root: FolderId,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl InMemoryFileStore {
    /// Create an empty store whose root folder is named `root_name`.
    pub fn new(root_name: &str) -> Self {
        let root = FolderId::new("root");
        let mut state = State::default();
        state.folders.insert(
            root.clone(),
            Folder {
                name: root_name.to_string(),
                parent: None,
            },
        );
        Self {
            state: RwLock::new(state),
            root,
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of `read_file` calls served.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of successful `create_file` and `write_file` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of files stored.
    pub fn file_count(&self) -> StoreResult<usize> {
        Ok(self.read_state()?.files.len())
    }

    /// Slash-joined folder names from the root to `folder`, excluding the root.
    pub fn folder_path(&self, folder: &FolderId) -> StoreResult<String> {
        let state = self.read_state()?;
        let mut names = Vec::new();
        let mut current = state.folders.get(folder);
        while let Some(f) = current {
            let Some(parent) = &f.parent else { break };
            names.push(f.name.clone());
            current = state.folders.get(parent);
        }
        names.reverse();
        Ok(names.join("/"))
    }

    fn read_state(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    /// Store a file under a caller-chosen id in the root folder, replacing
    /// any file with that id. Not counted as a write.
    pub fn seed_file(&self, id: FileId, name: &str, content: &str) -> StoreResult<()> {
        let mut state = self.write_state()?;
        let now = Utc::now();
        let info = FileInfo {
            id: id.clone(),
            name: name.to_string(),
            mime_type: String::new(),
            folder: self.root.clone(),
            size: content.len() as u64,
            sharing: SharingPolicy::default(),
            created: now,
            updated: now,
        };
        state.files.insert(
            id,
            StoredFile {
                info,
                content: content.to_string(),
            },
        );
        Ok(())
    }

    fn write_state(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl FileStore for InMemoryFileStore {
    fn root(&self) -> StoreResult<FolderId> {
        Ok(self.root.clone())
    }

    fn find_folder(&self, parent: &FolderId, name: &str) -> StoreResult<Option<FolderId>> {
        let state = self.read_state()?;
        let mut matches: Vec<&FolderId> = state
            .folders
            .iter()
            .filter(|(_, f)| f.parent.as_ref() == Some(parent) && f.name == name)
            .map(|(id, _)| id)
            .collect();
        matches.sort();
        Ok(matches.first().map(|id| (*id).clone()))
    }

    fn create_folder(&self, parent: &FolderId, name: &str) -> StoreResult<FolderId> {
        let mut state = self.write_state()?;
        if !state.folders.contains_key(parent) {
            return Err(StoreError::NotFound {
                locator: parent.to_string(),
            });
        }
        state.next_folder += 1;
        let id = FolderId::new(format!("folder-{}", state.next_folder));
        state.folders.insert(
            id.clone(),
            Folder {
                name: name.to_string(),
                parent: Some(parent.clone()),
            },
        );
        Ok(id)
    }

    fn create_file(&self, folder: &FolderId, file: NewFile<'_>) -> StoreResult<FileId> {
        let mut state = self.write_state()?;
        if !state.folders.contains_key(folder) {
            return Err(StoreError::NotFound {
                locator: folder.to_string(),
            });
        }
        let mut id = FileId::generate();
        while state.files.contains_key(&id) {
            id = FileId::generate();
        }
        let now = Utc::now();
        let info = FileInfo {
            id: id.clone(),
            name: file.name.to_string(),
            mime_type: file.mime_type.to_string(),
            folder: folder.clone(),
            size: file.content.len() as u64,
            sharing: file.sharing,
            created: now,
            updated: now,
        };
        state.files.insert(
            id.clone(),
            StoredFile {
                info,
                content: file.content.to_string(),
            },
        );
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    fn read_file(&self, id: &FileId) -> StoreResult<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let state = self.read_state()?;
        Ok(state.files.get(id).map(|f| f.content.clone()))
    }

    fn write_file(&self, id: &FileId, content: &str) -> StoreResult<bool> {
        let mut state = self.write_state()?;
        let Some(file) = state.files.get_mut(id) else {
            return Ok(false);
        };
        file.content = content.to_string();
        file.info.size = content.len() as u64;
        file.info.updated = Utc::now();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    fn file_info(&self, id: &FileId) -> StoreResult<Option<FileInfo>> {
        let state = self.read_state()?;
        Ok(state.files.get(id).map(|f| f.info.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_file<'a>(name: &'a str, content: &'a str) -> NewFile<'a> {
        NewFile {
            name,
            mime_type: "application/json",
            content,
            sharing: SharingPolicy::Public,
        }
    }

    #[test]
    fn create_read_write_file() {
        let store = InMemoryFileStore::new("Demo");
        let root = store.root().unwrap();
        let id = store.create_file(&root, new_file("a.json", "{}")).unwrap();
        assert!(FileId::matches_shape(id.as_str()));
        assert_eq!(store.read_file(&id).unwrap().as_deref(), Some("{}"));

        assert!(store.write_file(&id, "[1]").unwrap());
        assert_eq!(store.read_file(&id).unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.read_count(), 2);
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn missing_file_reads_none_and_writes_false() {
        let store = InMemoryFileStore::new("Demo");
        let id = FileId::generate();
        assert!(store.read_file(&id).unwrap().is_none());
        assert!(!store.write_file(&id, "x").unwrap());
        assert!(store.file_info(&id).unwrap().is_none());
    }

    #[test]
    fn folder_by_path_creates_once() {
        let store = InMemoryFileStore::new("Demo");
        let root = store.root().unwrap();
        let a = store.folder_by_path(&root, "Demo Content / Posts").unwrap();
        let b = store.folder_by_path(&root, "Demo Content/Posts").unwrap();
        assert_eq!(a, b);
        assert_eq!(store.folder_path(&a).unwrap(), "Demo Content/Posts");
    }

    #[test]
    fn file_info_tracks_updates() {
        let store = InMemoryFileStore::new("Demo");
        let root = store.root().unwrap();
        let id = store
            .create_file(
                &root,
                NewFile {
                    sharing: SharingPolicy::Private,
                    ..new_file("b.html", "<p></p>")
                },
            )
            .unwrap();
        store.write_file(&id, "<p>longer</p>").unwrap();
        let info = store.file_info(&id).unwrap().unwrap();
        assert_eq!(info.name, "b.html");
        assert_eq!(info.size, "<p>longer</p>".len() as u64);
        assert_eq!(info.sharing, SharingPolicy::Private);
        assert!(info.updated >= info.created);
    }

    #[test]
    fn create_in_unknown_folder_fails() {
        let store = InMemoryFileStore::new("Demo");
        let err = store
            .create_file(&FolderId::new("ghost"), new_file("a.json", "{}"))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn seeded_file_is_readable_but_not_counted() {
        let store = InMemoryFileStore::new("Demo");
        let id = FileId::parse("17wmkJn5wDY8o_91kYw72XLT_NdZS3u0W").unwrap();
        store.seed_file(id.clone(), "seed.json", "{\"s\":1}").unwrap();
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.read_file(&id).unwrap().as_deref(), Some("{\"s\":1}"));
    }
}
