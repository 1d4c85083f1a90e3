//! Reference classification for cell content.
//!
//! A cell holds one opaque string. Before any network or file call, that
//! string is classified, synchronously and without side effects, into exactly
//! one of three kinds, with an orthogonal auto-load flag carried by the
//! editor's scheme tag:
//!
//! - **Inline** -- the cell value is the content (bracket-matched literal, or empty)
//! - **Managed pointer** -- a managed-store file id, bare or inside a canonical URL
//! - **Remote pointer** -- any other absolute URL
//!
//! The inverse direction, [`encode_reference`], rebuilds the cell string after
//! a save so that the next classification recovers the same locator and flags.
//!
//! # Modules
//!
//! - [`error`] -- [`RefError`]
//! - [`classify`] -- the ordered-rule [`Classifier`]
//! - [`encode`] -- cell string re-encoding

pub mod classify;
pub mod encode;
pub mod error;

pub use classify::{Classified, Classifier, ReferenceKind, RULES};
pub use encode::encode_reference;
pub use error::{RefError, Result};
