use std::fmt;

use serde::Serialize;
use thiserror::Error;

use cellref_cache::CacheError;
use cellref_config::ConfigError;
use cellref_refs::RefError;
use cellref_store::StoreError;
use cellref_types::EditorKind;

/// Errors returned by `load` and `save`.
///
/// Every error is terminal for the call that produced it. Nothing is retried.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Reference(#[from] RefError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("malformed {editor} content: {reason}")]
    MalformedContent { editor: EditorKind, reason: String },

    #[error("internal error: {0}")]
    Internal(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Coarse classification of an [`EngineError`], for the message shown to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidReference,
    NotFound,
    WebhookNotConfigured,
    NoWebhookResponse,
    Transport,
    MalformedContent,
    InvalidOperation,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidReference => "invalid_reference",
            ErrorKind::NotFound => "not_found",
            ErrorKind::WebhookNotConfigured => "webhook_not_configured",
            ErrorKind::NoWebhookResponse => "no_webhook_response",
            ErrorKind::Transport => "transport",
            ErrorKind::MalformedContent => "malformed_content",
            ErrorKind::InvalidOperation => "invalid_operation",
            ErrorKind::Internal => "internal",
        }
    }

    /// `false` only for editor-side errors (content the editor failed to parse).
    pub fn is_engine_error(self) -> bool {
        self != ErrorKind::MalformedContent
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Reference(_) => ErrorKind::InvalidReference,
            EngineError::Store(e) => match e {
                StoreError::NotFound { .. } => ErrorKind::NotFound,
                StoreError::InvalidLocator { .. } => ErrorKind::InvalidReference,
                StoreError::Unsupported { .. } => ErrorKind::InvalidOperation,
                StoreError::WebhookNotConfigured => ErrorKind::WebhookNotConfigured,
                StoreError::NoWebhookResponse { .. } => ErrorKind::NoWebhookResponse,
                StoreError::Transport(_) | StoreError::Io(_) => ErrorKind::Transport,
                StoreError::Serialization(_) | StoreError::LockPoisoned(_) => ErrorKind::Internal,
            },
            EngineError::Cache(_) | EngineError::Config(_) | EngineError::Internal(_) => {
                ErrorKind::Internal
            }
            EngineError::InvalidOperation(_) => ErrorKind::InvalidOperation,
            EngineError::MalformedContent { .. } => ErrorKind::MalformedContent,
        }
    }
}
