use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::traits::{ContentStore, ObjectMetadata, StoreKind};

/// The cell value is the content.
///
/// `read` returns the locator itself, `update` accepts anything, and `create`
/// is unsupported because inline content has no locator of its own.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineStore;

#[async_trait]
impl ContentStore for InlineStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Inline
    }

    async fn read(&self, locator: &str) -> StoreResult<String> {
        Ok(locator.to_string())
    }

    async fn create(&self, _content: &str, _metadata: &ObjectMetadata) -> StoreResult<String> {
        Err(StoreError::Unsupported {
            store: "inline",
            operation: "create",
        })
    }

    async fn update(&self, _locator: &str, _content: &str) -> StoreResult<()> {
        Ok(())
    }
}
