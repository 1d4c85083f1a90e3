//! Canonical URLs for managed-store files.

use serde::{Deserialize, Serialize};

use crate::file_id::FileId;

/// Default base URL of the managed file store.
pub const DEFAULT_MANAGED_BASE_URL: &str = "https://drive.google.com";

/// Builds and recognises canonical managed-store URLs.
///
/// Recognised forms, relative to the base:
/// - `/file/d/<id>/view` (also `/edit` and bare `/file/d/<id>`)
/// - `/open?id=<id>[&...]`
/// - `/uc?id=<id>[&...]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedUrls {
    base: String,
}

impl ManagedUrls {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Direct-content URL. This is the form stored in non-auto-loaded cells.
    pub fn uc_url(&self, id: &str) -> String {
        format!("{}/uc?id={id}", self.base)
    }

    pub fn view_url(&self, id: &str) -> String {
        format!("{}/file/d/{id}/view", self.base)
    }

    pub fn edit_url(&self, id: &str) -> String {
        format!("{}/file/d/{id}/edit", self.base)
    }

    pub fn download_url(&self, id: &str) -> String {
        format!("{}&export=download", self.uc_url(id))
    }

    /// Returns `true` if `url` starts with the managed-store base.
    pub fn is_managed_url(&self, url: &str) -> bool {
        url.strip_prefix(&self.base)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    /// Extract the embedded file id from a canonical URL.
    ///
    /// Returns `None` when `url` is not under the base or the embedded token
    /// does not satisfy the [`FileId`] shape.
    pub fn extract_id(&self, url: &str) -> Option<String> {
        let path = url.strip_prefix(&self.base)?.strip_prefix('/')?;
        let token = match path.strip_prefix("file/d/") {
            Some(rest) => rest.split(['/', '?', '#']).next()?,
            None => {
                let (_, query) = path.split_once('?')?;
                query
                    .split('&')
                    .find_map(|pair| pair.strip_prefix("id="))?
            }
        };
        FileId::matches_shape(token).then(|| token.to_string())
    }
}

impl Default for ManagedUrls {
    fn default() -> Self {
        Self::new(DEFAULT_MANAGED_BASE_URL)
    }
}
