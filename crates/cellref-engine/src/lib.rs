//! Content resolution and synchronization for spreadsheet cells.
//!
//! A cell holds a short reference string; this crate turns it into full
//! content for an editor ([`ContentEngine::load`]) and commits edited content
//! back to the right store while re-encoding the reference
//! ([`ContentEngine::save`]).
//!
//! # Modules
//!
//! - [`context`] -- [`DocumentContext`] (cache and properties) and [`Backends`]
//! - [`sheet`] -- the [`Sheet`] collaborator and [`InMemorySheet`]
//! - [`resolver`] -- the load path
//! - [`committer`] -- the save path and its four modes
//! - [`engine`] -- the [`ContentEngine`] facade
//! - [`validate`] -- editor-side content checks
//! - [`error`] -- [`EngineError`] and the [`ErrorKind`] taxonomy

pub mod committer;
pub mod context;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod sheet;
pub mod validate;

pub use committer::{CommitSettings, ContentCommitter};
pub use context::{Backends, DocumentContext};
pub use engine::ContentEngine;
pub use error::{EngineError, EngineResult, ErrorKind};
pub use resolver::ContentResolver;
pub use sheet::{CellContext, InMemorySheet, Sheet};
pub use validate::validate_content;

pub use cellref_types::{ContentRecord, EditorKind, SetMode};
