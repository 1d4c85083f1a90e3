//! Backing stores for cell content.
//!
//! Every store implements the async [`ContentStore`] trait (`read`, `create`,
//! `update`), so the resolver and committer can treat them interchangeably:
//!
//! - [`InlineStore`] -- the cell value is the content; no I/O
//! - [`ManagedStore`] -- files in a project-scoped managed file store
//! - the remote webhook store lives in `cellref-webhook`
//!
//! The managed store talks to a synchronous [`FileStore`] collaborator:
//!
//! - [`InMemoryFileStore`] -- `HashMap`-based store for tests and embedding
//! - [`LocalFileStore`] -- a directory on disk with a JSON index
//!
//! # Design Rules
//!
//! 1. A locator that points nowhere is [`StoreError::NotFound`], never an
//!    empty read.
//! 2. Writes are keyed by locator and idempotent: repeating an update with
//!    the same content leaves the store in the same state.
//! 3. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod inline;
pub mod local;
pub mod managed;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use inline::InlineStore;
pub use local::LocalFileStore;
pub use managed::ManagedStore;
pub use memory::InMemoryFileStore;
pub use traits::{ContentStore, FileInfo, FileStore, FolderId, NewFile, ObjectMetadata, StoreKind};
