//! Normalization rules for matching user-entered values.
//!
//! Two domains with different strictness:
//!
//! - category keys, used to match requirement rules against record
//!   categories. Case-insensitive; any run of whitespace and underscores is
//!   one separator.
//! - identifier values (serial numbers, tag ids), used for duplicate
//!   detection. Case-insensitive and trimmed; interior whitespace is kept.
//!
//! Both apply NFKC first so full-width digits and compatibility forms typed
//! on mobile keyboards match their ASCII spelling.

use unicode_normalization::UnicodeNormalization;

/// Separator used between words of a category key
pub const CATEGORY_KEY_SEPARATOR: char = '_';

/// Normalize a category name to its lookup key.
///
/// `"Enclosure Active"`, `"enclosure_active"` and `" ENCLOSURE _ ACTIVE "`
/// all map to `"enclosure_active"`. Hyphens are not separators.
pub fn category_key(raw: &str) -> String {
    let folded: String = raw.nfkc().collect::<String>().to_lowercase();
    let mut key = String::with_capacity(folded.len());
    let mut pending_separator = false;

    for c in folded.chars() {
        if c.is_whitespace() || c == CATEGORY_KEY_SEPARATOR {
            pending_separator = true;
            continue;
        }
        if pending_separator && !key.is_empty() {
            key.push(CATEGORY_KEY_SEPARATOR);
        }
        pending_separator = false;
        key.push(c);
    }

    key
}

/// Normalize a serial number or tag id; `None` when nothing is left.
pub fn value_key(raw: &str) -> Option<String> {
    let folded = raw.nfkc().collect::<String>();
    let trimmed = folded.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// [`value_key`] over an optional field
pub fn optional_value_key(raw: Option<&str>) -> Option<String> {
    raw.and_then(value_key)
}

/// True when a required text field has no content after trimming
pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_key_collapses_separators() {
        assert_eq!(category_key("Enclosure Active"), "enclosure_active");
        assert_eq!(category_key("enclosure_active"), "enclosure_active");
        assert_eq!(category_key(" ENCLOSURE _ ACTIVE "), "enclosure_active");
        assert_eq!(category_key("MW__Passive"), "mw_passive");
    }

    #[test]
    fn test_category_key_keeps_hyphens() {
        assert_eq!(category_key("Enclosure-Active"), "enclosure-active");
        assert_ne!(category_key("Enclosure-Active"), category_key("Enclosure Active"));
    }

    #[test]
    fn test_category_key_empty() {
        assert_eq!(category_key(""), "");
        assert_eq!(category_key(" _ "), "");
    }

    #[test]
    fn test_value_key() {
        assert_eq!(value_key("  SN1 "), Some("sn1".to_string()));
        assert_eq!(value_key("Tag 01"), Some("tag 01".to_string()));
        assert_eq!(value_key("   "), None);
        assert_eq!(value_key(""), None);
    }

    #[test]
    fn test_value_key_compatibility_forms() {
        // full-width "SN1"
        assert_eq!(value_key("\u{FF33}\u{FF2E}\u{FF11}"), Some("sn1".to_string()));
    }

    #[test]
    fn test_optional_value_key() {
        assert_eq!(optional_value_key(None), None);
        assert_eq!(optional_value_key(Some(" ")), None);
        assert_eq!(optional_value_key(Some("A")), Some("a".to_string()));
    }
}
