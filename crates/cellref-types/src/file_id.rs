use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Characters used when generating new identifiers.
const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Identifier of an object in the managed file store.
///
/// The shape contract is deliberately loose: the first character is `1` and
/// the total length is between 31 and 34 characters. Real identifiers are
/// around 33 characters, e.g. `17wmkJn5wDY8o_91kYw72XLT_NdZS3u0W`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileId(String);

impl FileId {
    /// Required first character.
    pub const LEADING_CHAR: char = '1';
    /// Minimum length in characters.
    pub const MIN_LEN: usize = 31;
    /// Maximum length in characters.
    pub const MAX_LEN: usize = 34;
    /// Length of generated identifiers.
    pub const GENERATED_LEN: usize = 33;

    /// Returns `true` if `value` satisfies the identifier shape.
    pub fn matches_shape(value: &str) -> bool {
        value.starts_with(Self::LEADING_CHAR)
            && (Self::MIN_LEN..=Self::MAX_LEN).contains(&value.chars().count())
    }

    /// Parse and validate an identifier.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        if !value.starts_with(Self::LEADING_CHAR) {
            return Err(TypeError::InvalidFileId {
                value: value.to_string(),
                reason: format!("must start with '{}'", Self::LEADING_CHAR),
            });
        }
        let len = value.chars().count();
        if !(Self::MIN_LEN..=Self::MAX_LEN).contains(&len) {
            return Err(TypeError::InvalidFileId {
                value: value.to_string(),
                reason: format!(
                    "length {len} outside {}..={}",
                    Self::MIN_LEN,
                    Self::MAX_LEN
                ),
            });
        }
        Ok(Self(value.to_string()))
    }

    /// Generate a fresh random identifier that satisfies the shape contract.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut id = String::with_capacity(Self::GENERATED_LEN);
        id.push(Self::LEADING_CHAR);
        for _ in 1..Self::GENERATED_LEN {
            let idx = rng.gen_range(0..ID_ALPHABET.len());
            id.push(ID_ALPHABET[idx] as char);
        }
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FileId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FileId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FileId> for String {
    fn from(id: FileId) -> Self {
        id.0
    }
}

impl AsRef<str> for FileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Visibility of a newly created managed file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharingPolicy {
    /// Anyone with the link can view. Used for embeddable content.
    #[default]
    Public,
    /// Only the owner can access.
    Private,
}

impl SharingPolicy {
    /// Access level name as understood by the file store.
    pub fn access(self) -> &'static str {
        match self {
            SharingPolicy::Public => "ANYONE_WITH_LINK",
            SharingPolicy::Private => "PRIVATE",
        }
    }

    /// Permission name as understood by the file store.
    pub fn permission(self) -> &'static str {
        match self {
            SharingPolicy::Public => "VIEW",
            SharingPolicy::Private => "NONE",
        }
    }
}

impl FromStr for SharingPolicy {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(SharingPolicy::Public),
            "private" => Ok(SharingPolicy::Private),
            other => Err(TypeError::UnknownSharing(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_id_matches_shape() {
        assert!(FileId::matches_shape("17wmkJn5wDY8o_91kYw72XLT_NdZS3u0W"));
        assert!(FileId::parse("17wmkJn5wDY8o_91kYw72XLT_NdZS3u0W").is_ok());
    }

    #[test]
    fn wrong_leading_char_rejected() {
        let err = FileId::parse("27wmkJn5wDY8o_91kYw72XLT_NdZS3u0W").unwrap_err();
        assert!(matches!(err, TypeError::InvalidFileId { .. }));
    }

    #[test]
    fn length_bounds() {
        let short = format!("1{}", "a".repeat(29));
        let min = format!("1{}", "a".repeat(30));
        let max = format!("1{}", "a".repeat(33));
        let long = format!("1{}", "a".repeat(34));
        assert!(!FileId::matches_shape(&short));
        assert!(FileId::matches_shape(&min));
        assert!(FileId::matches_shape(&max));
        assert!(!FileId::matches_shape(&long));
    }

    #[test]
    fn generated_ids_match_shape_and_differ() {
        let a = FileId::generate();
        let b = FileId::generate();
        assert!(FileId::matches_shape(a.as_str()));
        assert_eq!(a.as_str().len(), FileId::GENERATED_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn serde_validates() {
        let ok: FileId = serde_json::from_str("\"17wmkJn5wDY8o_91kYw72XLT_NdZS3u0W\"").unwrap();
        assert_eq!(ok.as_str(), "17wmkJn5wDY8o_91kYw72XLT_NdZS3u0W");
        assert!(serde_json::from_str::<FileId>("\"nope\"").is_err());
    }

    #[test]
    fn sharing_names() {
        assert_eq!(SharingPolicy::default(), SharingPolicy::Public);
        assert_eq!(SharingPolicy::Public.access(), "ANYONE_WITH_LINK");
        assert_eq!(SharingPolicy::Private.permission(), "NONE");
        assert_eq!("PRIVATE".parse::<SharingPolicy>().unwrap(), SharingPolicy::Private);
    }

    proptest! {
        #[test]
        fn any_one_prefixed_string_in_range_matches(tail in "[^\\x00]{31,33}") {
            let candidate = format!("1{tail}");
            let len = candidate.chars().count();
            prop_assume!((FileId::MIN_LEN..=FileId::MAX_LEN).contains(&len));
            prop_assert!(FileId::matches_shape(&candidate));
        }
    }
}
