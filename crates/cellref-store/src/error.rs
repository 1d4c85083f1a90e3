/// Errors from backing store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The locator does not name an existing object.
    #[error("object not found: {locator}")]
    NotFound { locator: String },

    /// The locator is not in a form this store understands.
    #[error("invalid locator {locator:?}: {reason}")]
    InvalidLocator { locator: String, reason: String },

    /// The store cannot perform this operation at all.
    #[error("{store} store does not support {operation}")]
    Unsupported {
        store: &'static str,
        operation: &'static str,
    },

    /// No webhook URL is configured for this document.
    #[error("no webhook configured for this document")]
    WebhookNotConfigured,

    /// The webhook accepted a create but did not return a locator.
    #[error("webhook returned no resource url: {reason}")]
    NoWebhookResponse { reason: String },

    /// Network or remote failure. The remote's response body is not parsed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A lock guarding store state was poisoned.
    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
