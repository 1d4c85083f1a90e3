use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use cellref_store::{ContentStore, ObjectMetadata, StoreError, StoreKind, StoreResult};
use cellref_types::{EditorConfig, EditorKind};

use crate::envelope::{locator_from_response, WebhookEnvelope};
use crate::transport::HttpTransport;

/// Content stored outside the managed store, behind a webhook relay.
///
/// Locators are URLs. Writes fail with [`StoreError::WebhookNotConfigured`]
/// before any network call when no webhook URL is set.
#[derive(Clone)]
pub struct RemoteStore {
    transport: Arc<dyn HttpTransport>,
    editor: &'static EditorConfig,
    webhook_url: Option<String>,
}

impl RemoteStore {
    pub fn new(transport: Arc<dyn HttpTransport>, editor: EditorKind, webhook_url: Option<String>) -> Self {
        Self {
            transport,
            editor: editor.config(),
            webhook_url: webhook_url.filter(|u| !u.trim().is_empty()),
        }
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref()
    }

    /// The configured webhook URL, or [`StoreError::WebhookNotConfigured`].
    pub fn require_webhook(&self) -> StoreResult<&str> {
        self.webhook_url
            .as_deref()
            .ok_or(StoreError::WebhookNotConfigured)
    }

    async fn emit(&self, envelope: &WebhookEnvelope) -> StoreResult<String> {
        let hook = self.require_webhook()?;
        let body = serde_json::to_value(envelope)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.transport.post_json(hook, &body).await.inspect_err(|e| {
            warn!(event = %envelope.event, create = envelope.is_create(), error = %e, "webhook call failed");
        })
    }
}

#[async_trait]
impl ContentStore for RemoteStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Remote
    }

    async fn read(&self, locator: &str) -> StoreResult<String> {
        self.transport.get(locator).await
    }

    async fn create(&self, content: &str, _metadata: &ObjectMetadata) -> StoreResult<String> {
        let envelope = WebhookEnvelope::create(self.editor.webhook_event, content);
        let response = self.emit(&envelope).await?;
        let url = locator_from_response(&response)?;
        info!(event = %envelope.event, url = %url, "created remote resource");
        Ok(url)
    }

    async fn update(&self, locator: &str, content: &str) -> StoreResult<()> {
        let envelope = WebhookEnvelope::update(self.editor.webhook_event, locator, content);
        self.emit(&envelope).await?;
        info!(event = %envelope.event, url = %locator, "updated remote resource");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::RecordingTransport;
    use serde_json::json;

    const HOOK: &str = "https://hooks.example.com/content";

    fn store(transport: &Arc<RecordingTransport>, hook: Option<&str>) -> RemoteStore {
        RemoteStore::new(transport.clone(), EditorKind::Json, hook.map(str::to_string))
    }

    #[tokio::test]
    async fn create_posts_envelope_and_returns_url() {
        let transport = Arc::new(RecordingTransport::new());
        transport
            .respond_to_posts(r#"{"url":"https://cms.example.com/doc/7"}"#)
            .unwrap();
        let url = store(&transport, Some(HOOK))
            .create("{\"a\":1}", &ObjectMetadata::default())
            .await
            .unwrap();
        assert_eq!(url, "https://cms.example.com/doc/7");

        let calls = transport.calls().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, HOOK);
        assert_eq!(
            calls[0].body,
            Some(json!({"event": "jsoneditor", "resource": null, "data": "{\"a\":1}"}))
        );
    }

    #[tokio::test]
    async fn update_sends_resource() {
        let transport = Arc::new(RecordingTransport::new());
        store(&transport, Some(HOOK))
            .update("https://cms.example.com/doc/7", "[]")
            .await
            .unwrap();
        let calls = transport.calls().unwrap();
        assert_eq!(
            calls[0].body.as_ref().unwrap()["resource"],
            "https://cms.example.com/doc/7"
        );
    }

    #[tokio::test]
    async fn missing_webhook_fails_before_network() {
        let transport = Arc::new(RecordingTransport::new());
        for hook in [None, Some("  ")] {
            let remote = store(&transport, hook);
            let err = remote.create("{}", &ObjectMetadata::default()).await.unwrap_err();
            assert!(matches!(err, StoreError::WebhookNotConfigured));
            let err = remote.update("https://e.co/x", "{}").await.unwrap_err();
            assert!(matches!(err, StoreError::WebhookNotConfigured));
        }
        assert_eq!(transport.call_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn create_without_url_in_response_fails() {
        let transport = Arc::new(RecordingTransport::new());
        let err = store(&transport, Some(HOOK))
            .create("{}", &ObjectMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NoWebhookResponse { .. }));
    }

    #[tokio::test]
    async fn read_is_a_get_and_needs_no_webhook() {
        let transport = Arc::new(RecordingTransport::new());
        transport.set_page("https://e.co/a.json", "[1]").unwrap();
        let content = store(&transport, None).read("https://e.co/a.json").await.unwrap();
        assert_eq!(content, "[1]");
    }
}
