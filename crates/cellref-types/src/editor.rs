//! Editor kinds and their fixed configurations.
//!
//! Each editor that stores content behind a cell reference has its own
//! auto-load scheme tag, webhook event name, mime type and empty default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The editor a reference belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorKind {
    /// JSON document editor.
    Json,
    /// Rich-text HTML editor.
    Html,
}

impl EditorKind {
    /// All editor kinds, in declaration order.
    pub const ALL: [EditorKind; 2] = [EditorKind::Json, EditorKind::Html];

    /// The static configuration for this editor.
    pub fn config(self) -> &'static EditorConfig {
        match self {
            EditorKind::Json => &EditorConfig::JSON,
            EditorKind::Html => &EditorConfig::HTML,
        }
    }

    /// Lowercase name (`"json"`, `"html"`).
    pub fn as_str(self) -> &'static str {
        match self {
            EditorKind::Json => "json",
            EditorKind::Html => "html",
        }
    }
}

impl fmt::Display for EditorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditorKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(EditorKind::Json),
            "html" => Ok(EditorKind::Html),
            other => Err(TypeError::UnknownEditor(other.to_string())),
        }
    }
}

/// Fixed per-editor constants.
#[derive(Debug, PartialEq, Eq)]
pub struct EditorConfig {
    /// The editor this configuration describes.
    pub kind: EditorKind,
    /// Prefix marking a reference as auto-loadable (e.g. `json://`).
    pub scheme_tag: &'static str,
    /// Event name sent to the webhook relay.
    pub webhook_event: &'static str,
    /// Mime type of files created in the managed store.
    pub mime_type: &'static str,
    /// Extension of files created in the managed store.
    pub file_ext: &'static str,
    /// Content returned for an empty cell.
    pub empty_content: &'static str,
    /// Opening/closing character pairs that mark an inline literal.
    pub inline_delimiters: &'static [(char, char)],
    /// Namespace prefix for this editor's cache keys.
    pub cache_prefix: &'static str,
}

impl EditorConfig {
    pub const JSON: Self = Self {
        kind: EditorKind::Json,
        scheme_tag: "json://",
        webhook_event: "jsoneditor",
        mime_type: "application/json",
        file_ext: "json",
        empty_content: "{}",
        inline_delimiters: &[('{', '}'), ('[', ']')],
        cache_prefix: "JSONEDITOR_",
    };

    pub const HTML: Self = Self {
        kind: EditorKind::Html,
        scheme_tag: "content://",
        webhook_event: "htmleditor",
        mime_type: "text/html",
        file_ext: "html",
        empty_content: "",
        inline_delimiters: &[('<', '>')],
        cache_prefix: "HTMLEDITOR_",
    };

    /// Returns `true` if `value` starts and ends with one of this editor's
    /// inline delimiter pairs.
    ///
    /// This is a shape check only; the content is not parsed.
    pub fn is_inline_literal(&self, value: &str) -> bool {
        let (Some(first), Some(last)) = (value.chars().next(), value.chars().last()) else {
            return false;
        };
        value.chars().count() >= 2
            && self
                .inline_delimiters
                .iter()
                .any(|(open, close)| first == *open && last == *close)
    }

    /// Strip this editor's scheme tag, if present.
    ///
    /// Returns the remainder and whether the tag was found.
    pub fn strip_scheme_tag<'a>(&self, raw: &'a str) -> (&'a str, bool) {
        match raw.strip_prefix(self.scheme_tag) {
            Some(rest) => (rest, true),
            None => (raw, false),
        }
    }
}
