//! Error types for reference operations.

use thiserror::Error;

/// Errors that can occur while interpreting a cell reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefError {
    /// The cell value is none of the accepted reference forms.
    #[error(
        "invalid reference {raw:?}: expected an inline literal, a managed file id, \
         a URL, or a '{scheme_tag}'-tagged id or URL"
    )]
    InvalidReference {
        raw: String,
        scheme_tag: &'static str,
    },
}

/// Convenience type alias for reference operations.
pub type Result<T> = std::result::Result<T, RefError>;
