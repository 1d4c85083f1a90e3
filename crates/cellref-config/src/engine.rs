use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use cellref_types::{ManagedUrls, SharingPolicy, DEFAULT_MANAGED_BASE_URL};

use crate::error::{ConfigError, ConfigResult};

/// Settings shared by every load and save of one engine instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Project name; managed content lives under `<project> Content/`.
    pub project_name: String,
    /// Base of canonical managed-store URLs.
    pub managed_base_url: String,
    /// Lifetime of cached pointer content.
    pub content_ttl_secs: u64,
    /// Webhook relay used when the document has no `WEBHOOK_URL` property.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    /// Bound on a single HTTP request.
    pub request_timeout_secs: u64,
    /// Sharing applied to newly created managed files.
    pub default_sharing: SharingPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            project_name: "Untitled".into(),
            managed_base_url: DEFAULT_MANAGED_BASE_URL.into(),
            content_ttl_secs: 21_600,
            webhook_url: None,
            request_timeout_secs: 30,
            default_sharing: SharingPolicy::Public,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(raw: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading engine config");
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.project_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "project_name",
                reason: "must not be empty".into(),
            });
        }
        if self.content_ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "content_ttl_secs",
                reason: "must be greater than zero".into(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                reason: "must be greater than zero".into(),
            });
        }
        check_absolute_url("managed_base_url", &self.managed_base_url)?;
        if let Some(hook) = &self.webhook_url {
            check_absolute_url("webhook_url", hook)?;
        }
        Ok(())
    }

    pub fn content_ttl(&self) -> Duration {
        Duration::from_secs(self.content_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn managed_urls(&self) -> ManagedUrls {
        ManagedUrls::new(self.managed_base_url.clone())
    }
}

fn check_absolute_url(field: &'static str, value: &str) -> ConfigResult<()> {
    let parsed = Url::parse(value).map_err(|e| ConfigError::Invalid {
        field,
        reason: format!("{value:?} is not an absolute URL: {e}"),
    })?;
    if parsed.cannot_be_a_base() {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("{value:?} is not a hierarchical URL"),
        });
    }
    Ok(())
}
