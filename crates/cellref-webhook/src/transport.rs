use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use cellref_store::{StoreError, StoreResult};

/// Default request timeout for [`ReqwestTransport`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP seam for remote reads and webhook writes.
///
/// Only status 200 is success. Anything else, including network failures, is
/// a single terminal [`StoreError::Transport`]; error bodies are not parsed.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET `url` and return the response body.
    async fn get(&self, url: &str) -> StoreResult<String>;

    /// POST `body` as JSON to `url` and return the response body.
    async fn post_json(&self, url: &str, body: &Value) -> StoreResult<String>;
}

/// [`HttpTransport`] over a reqwest client.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> StoreResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cellref/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    async fn finish(method: &str, url: &str, response: reqwest::Response) -> StoreResult<String> {
        let status = response.status();
        if status != StatusCode::OK {
            return Err(StoreError::Transport(format!("{method} {url} failed with status {status}")));
        }
        response
            .text()
            .await
            .map_err(|e| StoreError::Transport(format!("{method} {url}: {e}")))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> StoreResult<String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("GET {url}: {e}")))?;
        Self::finish("GET", url, response).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> StoreResult<String> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("POST {url}: {e}")))?;
        Self::finish("POST", url, response).await
    }
}

/// A request seen by [`RecordingTransport`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct Script {
    pages: HashMap<String, String>,
    post_response: Option<String>,
    calls: Vec<RecordedCall>,
}

/// Scripted in-memory [`HttpTransport`] for tests and offline use.
///
/// GETs are answered from registered pages (unknown URLs fail with a 404
/// transport error). POSTs return the configured response body, or an empty
/// body if none is set. Every request is recorded.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    script: Mutex<Script>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for GETs of `url`.
    pub fn set_page(&self, url: &str, body: &str) -> StoreResult<()> {
        self.lock()?.pages.insert(url.to_string(), body.to_string());
        Ok(())
    }

    /// Return `body` for every POST.
    pub fn respond_to_posts(&self, body: &str) -> StoreResult<()> {
        self.lock()?.post_response = Some(body.to_string());
        Ok(())
    }

    pub fn calls(&self) -> StoreResult<Vec<RecordedCall>> {
        Ok(self.lock()?.calls.clone())
    }

    pub fn call_count(&self) -> StoreResult<usize> {
        Ok(self.lock()?.calls.len())
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Script>> {
        self.script
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn get(&self, url: &str) -> StoreResult<String> {
        let mut script = self.lock()?;
        script.calls.push(RecordedCall {
            method: "GET",
            url: url.to_string(),
            body: None,
        });
        script
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| StoreError::Transport(format!("GET {url} failed with status 404")))
    }

    async fn post_json(&self, url: &str, body: &Value) -> StoreResult<String> {
        let mut script = self.lock()?;
        script.calls.push(RecordedCall {
            method: "POST",
            url: url.to_string(),
            body: Some(body.clone()),
        });
        Ok(script.post_response.clone().unwrap_or_default())
    }
}
