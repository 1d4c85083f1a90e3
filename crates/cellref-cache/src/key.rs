//! Deterministic cache key construction.

use std::fmt;

use cellref_refs::{Classified, ReferenceKind};
use cellref_types::EditorConfig;

/// Domain-separated BLAKE3 hasher for cache key material.
///
/// Remote URLs can be long and contain characters that are illegal in some
/// cache backends; hashing bounds the key length.
pub struct KeyHasher {
    domain: &'static str,
}

impl KeyHasher {
    /// Hasher for remote pointer URLs.
    pub const REMOTE_URL: Self = Self {
        domain: "cellref-remote-url-v1",
    };

    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hex-encoded 64-character digest of `data`.
    pub fn hex_digest(&self, data: &str) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data.as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Purpose segment of a cache key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CachePurpose {
    /// Full content of a pointer.
    Content,
    /// Metadata about a pointer (file info, headers).
    Metadata,
}

impl CachePurpose {
    fn segment(self) -> &'static str {
        match self {
            CachePurpose::Content => "CONTENT_",
            CachePurpose::Metadata => "META_",
        }
    }
}

/// A namespaced cache key: `<editor prefix><purpose>ID_<file id>` or
/// `<editor prefix><purpose>URL_<digest>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a managed-store file id. The id is already bounded and safe.
    pub fn managed(editor: &EditorConfig, purpose: CachePurpose, file_id: &str) -> Self {
        Self(format!(
            "{}{}ID_{file_id}",
            editor.cache_prefix,
            purpose.segment()
        ))
    }

    /// Key for a remote URL, hashed to a fixed length.
    pub fn remote(editor: &EditorConfig, purpose: CachePurpose, url: &str) -> Self {
        Self(format!(
            "{}{}URL_{}",
            editor.cache_prefix,
            purpose.segment(),
            KeyHasher::REMOTE_URL.hex_digest(url)
        ))
    }

    /// Key for a classified reference. Inline references have no key.
    pub fn for_reference(
        editor: &EditorConfig,
        purpose: CachePurpose,
        reference: &Classified,
    ) -> Option<Self> {
        Self::build(editor, purpose, reference.kind, &reference.value)
    }

    /// Key for a pointer value of the given kind.
    pub fn build(
        editor: &EditorConfig,
        purpose: CachePurpose,
        kind: ReferenceKind,
        value: &str,
    ) -> Option<Self> {
        match kind {
            ReferenceKind::Inline => None,
            ReferenceKind::ManagedPointer => Some(Self::managed(editor, purpose, value)),
            ReferenceKind::RemotePointer => Some(Self::remote(editor, purpose, value)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
