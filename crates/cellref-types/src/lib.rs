//! Foundation types for cell content references.
//!
//! A spreadsheet cell holds a single short string (a *reference*) that stands
//! in for content living inline, in the managed file store, or behind a
//! webhook relay. This crate holds the vocabulary every other crate shares.
//!
//! # Key Types
//!
//! - [`EditorKind`] / [`EditorConfig`] -- per-editor constants (scheme tag, mime type, defaults)
//! - [`ContentRecord`] -- the resolved unit handed to and from an editor
//! - [`SetMode`] -- the four save strategies
//! - [`FileId`] -- managed-store identifier with its shape contract
//! - [`SharingPolicy`] -- visibility of newly created managed files
//! - [`ManagedUrls`] -- canonical URL construction and extraction for managed files

pub mod editor;
pub mod error;
pub mod file_id;
pub mod record;
pub mod urls;

pub use editor::{EditorConfig, EditorKind};
pub use error::TypeError;
pub use file_id::{FileId, SharingPolicy};
pub use record::{ContentRecord, SetMode};
pub use urls::{ManagedUrls, DEFAULT_MANAGED_BASE_URL};
