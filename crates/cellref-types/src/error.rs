use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid file id {value:?}: {reason}")]
    InvalidFileId { value: String, reason: String },

    #[error("unknown editor kind: {0}")]
    UnknownEditor(String),

    #[error("unknown set mode: {0}")]
    UnknownSetMode(String),

    #[error("unknown sharing policy: {0}")]
    UnknownSharing(String),
}
