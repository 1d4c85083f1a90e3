//! Editor-side content checks.
//!
//! Neither `load` nor `save` validates content; an editor calls this before
//! saving so parse failures surface as [`ErrorKind::MalformedContent`]
//! instead of being written back.
//!
//! [`ErrorKind::MalformedContent`]: crate::ErrorKind::MalformedContent

use cellref_types::EditorKind;

use crate::error::{EngineError, EngineResult};

pub fn validate_content(editor: EditorKind, content: &str) -> EngineResult<()> {
    let reason = match editor {
        EditorKind::Json => serde_json::from_str::<serde_json::Value>(content)
            .err()
            .map(|e| e.to_string()),
        EditorKind::Html => unterminated_tag(content)
            .map(|offset| format!("unterminated tag starting at byte {offset}")),
    };
    match reason {
        Some(reason) => Err(EngineError::MalformedContent { editor, reason }),
        None => Ok(()),
    }
}

/// Byte offset of the first `<` that is not closed before the next `<` or
/// the end of input.
fn unterminated_tag(content: &str) -> Option<usize> {
    let mut open = None;
    for (i, c) in content.char_indices() {
        match c {
            '<' if open.is_some() => return open,
            '<' => open = Some(i),
            '>' => open = None,
            _ => {}
        }
    }
    open
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn json_must_parse() {
        assert!(validate_content(EditorKind::Json, "{\"a\":[1,2]}").is_ok());
        assert!(validate_content(EditorKind::Json, "[]").is_ok());
        let err = validate_content(EditorKind::Json, "{\"a\":").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedContent);
        assert!(!err.kind().is_engine_error());
    }

    #[test]
    fn html_tags_must_close() {
        assert!(validate_content(EditorKind::Html, "").is_ok());
        assert!(validate_content(EditorKind::Html, "<p>a &gt; b</p>").is_ok());
        assert!(validate_content(EditorKind::Html, "<p class=\"x\"").is_err());
        assert!(validate_content(EditorKind::Html, "<p <b>").is_err());
    }
}
