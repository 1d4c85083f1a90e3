use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::error::{ConfigError, ConfigResult};

/// Document property holding the webhook relay URL.
pub const WEBHOOK_URL: &str = "WEBHOOK_URL";
/// Document property holding the project name.
pub const PROJECT_NAME: &str = "PROJECT_NAME";
/// Document property holding the project's content root id.
pub const CONTENT_ID: &str = "CONTENT_ID";

/// Per-document key/value settings.
pub trait PropertyStore: Send + Sync {
    fn get(&self, key: &str) -> ConfigResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> ConfigResult<()>;

    /// Returns `true` if the key existed.
    fn delete(&self, key: &str) -> ConfigResult<bool>;

    /// All properties, ordered by key.
    fn all(&self) -> ConfigResult<BTreeMap<String, String>>;

    /// Like [`get`](Self::get), treating blank values as unset.
    fn get_non_empty(&self, key: &str) -> ConfigResult<Option<String>> {
        Ok(self.get(key)?.filter(|v| !v.trim().is_empty()))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPropertyStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: RwLock::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> ConfigError {
    ConfigError::LockPoisoned(e.to_string())
}

impl PropertyStore for InMemoryPropertyStore {
    fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        Ok(self.values.read().map_err(poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ConfigResult<()> {
        self.values
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> ConfigResult<bool> {
        Ok(self.values.write().map_err(poisoned)?.remove(key).is_some())
    }

    fn all(&self) -> ConfigResult<BTreeMap<String, String>> {
        Ok(self
            .values
            .read()
            .map_err(poisoned)?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
