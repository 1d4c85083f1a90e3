//! Ordered-rule classification of cell references.
//!
//! Categories can overlap (a remote URL may coincidentally satisfy a shape
//! check), so rules are tried in a fixed order and the first match wins:
//!
//! 1. strip the editor's scheme tag, recording `auto_loaded`
//! 2. empty remainder, or a bracket-matched literal → inline
//! 3. remainder has the managed file id shape → managed pointer
//! 4. remainder is a canonical managed-store URL → managed pointer (embedded id)
//! 5. remainder is an absolute URL → remote pointer
//! 6. anything else → [`RefError::InvalidReference`]

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use cellref_types::{EditorConfig, EditorKind, FileId, ManagedUrls};

use crate::error::{RefError, Result};

/// What a reference points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// The cell value is the content.
    Inline,
    /// A file in the managed store.
    ManagedPointer,
    /// A URL served by a remote party.
    RemotePointer,
}

impl ReferenceKind {
    /// Returns `true` for managed and remote pointers.
    pub fn is_pointer(self) -> bool {
        !matches!(self, ReferenceKind::Inline)
    }
}

/// Result of classifying a raw cell value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classified {
    pub kind: ReferenceKind,
    /// Whether the editor's scheme tag was present.
    pub auto_loaded: bool,
    /// Inline content, managed file id, or remote URL, with the tag removed.
    pub value: String,
}

/// A single classification rule, applied to the tag-stripped remainder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Empty, or starts and ends with one of the editor's delimiter pairs.
    InlineLiteral,
    /// Bare managed file id.
    ManagedId,
    /// Canonical managed-store URL with an embedded id.
    ManagedUrl,
    /// Any other absolute URL.
    AbsoluteUrl,
}

/// Rules in precedence order. Cell values in the wild rely on this order.
pub const RULES: [Rule; 4] = [
    Rule::InlineLiteral,
    Rule::ManagedId,
    Rule::ManagedUrl,
    Rule::AbsoluteUrl,
];

/// Classifies cell values for one editor.
#[derive(Clone, Debug)]
pub struct Classifier {
    editor: &'static EditorConfig,
    urls: ManagedUrls,
}

impl Classifier {
    pub fn new(editor: EditorKind, urls: ManagedUrls) -> Self {
        Self {
            editor: editor.config(),
            urls,
        }
    }

    pub fn editor(&self) -> &'static EditorConfig {
        self.editor
    }

    pub fn urls(&self) -> &ManagedUrls {
        &self.urls
    }

    /// Classify a raw cell value.
    ///
    /// Pure string inspection: no I/O, no parsing of inline content. A
    /// malformed JSON literal still classifies as inline; validating it is the
    /// editor's job.
    ///
    /// # Examples
    ///
    /// ```
    /// use cellref_refs::{Classifier, ReferenceKind};
    /// use cellref_types::{EditorKind, ManagedUrls};
    ///
    /// let c = Classifier::new(EditorKind::Json, ManagedUrls::default());
    /// assert_eq!(c.classify("").unwrap().kind, ReferenceKind::Inline);
    /// assert_eq!(c.classify("{\"a\":1}").unwrap().kind, ReferenceKind::Inline);
    /// let tagged = c.classify("json://https://example.com/a.json").unwrap();
    /// assert_eq!(tagged.kind, ReferenceKind::RemotePointer);
    /// assert!(tagged.auto_loaded);
    /// assert!(c.classify("hello").is_err());
    /// ```
    pub fn classify(&self, raw: &str) -> Result<Classified> {
        let (remainder, auto_loaded) = self.editor.strip_scheme_tag(raw);

        for rule in RULES {
            if let Some((kind, value)) = self.apply(rule, remainder) {
                debug!(editor = %self.editor.kind, ?rule, ?kind, auto_loaded, "classified reference");
                return Ok(Classified {
                    kind,
                    auto_loaded,
                    value,
                });
            }
        }

        Err(RefError::InvalidReference {
            raw: raw.to_string(),
            scheme_tag: self.editor.scheme_tag,
        })
    }

    fn apply(&self, rule: Rule, remainder: &str) -> Option<(ReferenceKind, String)> {
        match rule {
            Rule::InlineLiteral => (remainder.is_empty()
                || self.editor.is_inline_literal(remainder))
            .then(|| (ReferenceKind::Inline, remainder.to_string())),
            Rule::ManagedId => FileId::matches_shape(remainder)
                .then(|| (ReferenceKind::ManagedPointer, remainder.to_string())),
            Rule::ManagedUrl => self
                .urls
                .extract_id(remainder)
                .map(|id| (ReferenceKind::ManagedPointer, id)),
            Rule::AbsoluteUrl => is_absolute_url(remainder)
                .then(|| (ReferenceKind::RemotePointer, remainder.to_string())),
        }
    }
}

/// An absolute URL with an explicit `scheme://` separator.
fn is_absolute_url(value: &str) -> bool {
    value.contains("://") && Url::parse(value).is_ok()
}
