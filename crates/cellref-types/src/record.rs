use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The resolved unit passed to and from an editor.
///
/// A record is built fresh on every load. It is never persisted itself; only
/// the reference string derived from it is written back to the cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    /// Locator of the backing object (file id or URL). Absent for inline content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// URL the content can be fetched from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// URL a person can open to view the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_url: Option<String>,
    /// Whether the source lives in the managed file store.
    #[serde(default)]
    pub on_managed_store: bool,
    /// Whether the reference carried the editor's auto-load scheme tag.
    #[serde(default)]
    pub auto_loaded: bool,
    /// The content itself.
    #[serde(default)]
    pub content: String,
}

impl ContentRecord {
    /// A record for content held directly in the cell.
    pub fn inline(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Set the auto-loaded flag.
    pub fn with_auto_loaded(mut self, auto_loaded: bool) -> Self {
        self.auto_loaded = auto_loaded;
        self
    }

    /// Returns `true` if the record points at a backing store.
    pub fn has_source(&self) -> bool {
        self.source.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Save strategy chosen by the caller for a single save.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetMode {
    /// Write the content directly into the cell.
    Raw,
    /// Update the store the existing reference points at.
    Current,
    /// Create a new object in the managed store.
    NewInternal,
    /// Create a new object through the webhook relay.
    NewExternal,
}

impl SetMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SetMode::Raw => "RAW",
            SetMode::Current => "CURRENT",
            SetMode::NewInternal => "NEW_INTERNAL",
            SetMode::NewExternal => "NEW_EXTERNAL",
        }
    }
}

impl fmt::Display for SetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SetMode {
    type Err = TypeError;

    /// Accepts `RAW`, `raw`, `NEW_INTERNAL`, `new-internal` and so on.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "RAW" => Ok(SetMode::Raw),
            "CURRENT" => Ok(SetMode::Current),
            "NEW_INTERNAL" => Ok(SetMode::NewInternal),
            "NEW_EXTERNAL" => Ok(SetMode::NewExternal),
            _ => Err(TypeError::UnknownSetMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_record_has_no_source() {
        let r = ContentRecord::inline("{}");
        assert_eq!(r.content, "{}");
        assert!(!r.has_source());
        assert!(!r.on_managed_store);
        assert!(!r.auto_loaded);
    }

    #[test]
    fn empty_source_is_not_a_source() {
        let r = ContentRecord {
            source: Some(String::new()),
            ..Default::default()
        };
        assert!(!r.has_source());
    }

    #[test]
    fn record_serializes_camel_case_without_empty_options() {
        let r = ContentRecord::inline("x").with_auto_loaded(true);
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["autoLoaded"], true);
        assert_eq!(v["onManagedStore"], false);
        assert!(v.get("source").is_none());
        assert!(v.get("viewUrl").is_none());
    }

    #[test]
    fn set_mode_parsing() {
        assert_eq!("raw".parse::<SetMode>().unwrap(), SetMode::Raw);
        assert_eq!("new-internal".parse::<SetMode>().unwrap(), SetMode::NewInternal);
        assert_eq!("NEW_EXTERNAL".parse::<SetMode>().unwrap(), SetMode::NewExternal);
        assert!("BY_SOURCE".parse::<SetMode>().is_err());
    }

    #[test]
    fn set_mode_serde_matches_display() {
        for mode in [SetMode::Raw, SetMode::Current, SetMode::NewInternal, SetMode::NewExternal] {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{mode}\""));
        }
    }
}
