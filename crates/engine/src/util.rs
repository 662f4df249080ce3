//! Internal helpers for input normalization.
//!
//! These utilities are **not** part of the public API.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Trim and collapse inner whitespace. Returns `None` for blank input.
pub(crate) fn normalize_display(input: &str) -> Option<String> {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Blank descriptions are stored as `NULL`.
pub(crate) fn normalize_description(input: Option<String>) -> Option<String> {
    input.as_deref().and_then(normalize_display)
}

/// Comparison key for category names: NFKD, combining marks dropped,
/// lowercase, punctuation folded into single spaces.
pub(crate) fn normalize_category_key(input: &str) -> Option<String> {
    let mut out = String::new();
    let mut pending_space = false;
    for ch in input.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    if out.is_empty() { None } else { Some(out) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_collapses_whitespace() {
        assert_eq!(normalize_display("  Eating   out "), Some("Eating out".into()));
        assert_eq!(normalize_display(" \t "), None);
        assert_eq!(normalize_description(Some("   ".into())), None);
    }

    #[test]
    fn key_folds_case_accents_and_punctuation() {
        assert_eq!(normalize_category_key("Café"), Some("cafe".into()));
        assert_eq!(normalize_category_key("  Eating-Out! "), Some("eating out".into()));
        assert_eq!(normalize_category_key("???"), None);
        assert_eq!(
            normalize_category_key("Groceries"),
            normalize_category_key("GROCERIES")
        );
    }
}
