//! Re-encoding a locator into the string written back to the cell.

use cellref_types::{EditorConfig, ManagedUrls};

/// Build the cell value for a locator after a non-raw save.
///
/// `encoded = (auto_loaded ? tag : "") + (on_managed_store && !auto_loaded ? canonical_url : locator)`
///
/// Non-auto-loaded managed files are stored as their canonical URL so the
/// cell is clickable; auto-loaded references keep the bare locator behind the
/// tag.
pub fn encode_reference(
    editor: &EditorConfig,
    urls: &ManagedUrls,
    locator: &str,
    on_managed_store: bool,
    auto_loaded: bool,
) -> String {
    let tag = if auto_loaded { editor.scheme_tag } else { "" };
    if on_managed_store && !auto_loaded {
        format!("{tag}{}", urls.uc_url(locator))
    } else {
        format!("{tag}{locator}")
    }
}
