//! Input sanitization functions
//!
//! Values are cleaned before any rule sees them. Secrets are left alone.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Control characters other than newline and tab
    static ref CONTROL_CHARS: Regex = Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").unwrap();
}

/// Trim leading and trailing whitespace from a string
pub fn trim(value: &str) -> String {
    value.trim().to_string()
}

/// Remove control characters from a string
pub fn remove_control_chars(value: &str) -> String {
    CONTROL_CHARS.replace_all(value, "").to_string()
}

/// Trim and drop control characters
pub fn sanitize_text(value: &str) -> String {
    trim(&remove_control_chars(value))
}

/// Sanitize in place; a value that ends up empty becomes `None`
pub fn sanitize_optional(value: &mut Option<String>) {
    if let Some(s) = value {
        *s = sanitize_text(s);
        if s.is_empty() {
            *value = None;
        }
    }
}

/// Like [`sanitize_optional`] but keeps empty strings so presence checks
/// still see the key
pub fn sanitize_in_place(value: &mut Option<String>) {
    if let Some(s) = value {
        *s = sanitize_text(s);
    }
}
