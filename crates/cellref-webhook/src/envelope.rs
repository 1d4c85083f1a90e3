use serde::{Deserialize, Serialize};
use url::Url;

use cellref_store::{StoreError, StoreResult};

/// Body POSTed to the webhook relay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    /// Editor event tag, e.g. `jsoneditor`.
    pub event: String,
    /// Existing resource URL for updates; `null` for creates.
    pub resource: Option<String>,
    /// The content.
    pub data: String,
}

impl WebhookEnvelope {
    pub fn create(event: &str, data: &str) -> Self {
        Self {
            event: event.to_string(),
            resource: None,
            data: data.to_string(),
        }
    }

    pub fn update(event: &str, resource: &str, data: &str) -> Self {
        Self {
            event: event.to_string(),
            resource: Some(resource.to_string()),
            data: data.to_string(),
        }
    }

    pub fn is_create(&self) -> bool {
        self.resource.is_none()
    }
}

#[derive(Deserialize)]
struct CreateResponse {
    url: Option<String>,
}

/// Extract the new resource URL from a create response body.
///
/// The body must be a JSON object whose `url` is an absolute URL.
pub fn locator_from_response(body: &str) -> StoreResult<String> {
    if body.trim().is_empty() {
        return Err(StoreError::NoWebhookResponse {
            reason: "empty response body".into(),
        });
    }
    let parsed: CreateResponse =
        serde_json::from_str(body).map_err(|e| StoreError::NoWebhookResponse {
            reason: format!("response is not a JSON object: {e}"),
        })?;
    let url = match parsed.url {
        Some(url) if !url.trim().is_empty() => url,
        _ => {
            return Err(StoreError::NoWebhookResponse {
                reason: "response has no url".into(),
            })
        }
    };
    if !url.contains("://") || Url::parse(&url).is_err() {
        return Err(StoreError::NoWebhookResponse {
            reason: format!("response url {url:?} is not an absolute URL"),
        });
    }
    Ok(url)
}
