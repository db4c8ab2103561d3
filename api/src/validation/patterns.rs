//! Pattern library for registration fields
//!
//! Regexes, blacklists and length bounds, one set per field type. The field
//! validators compose these; nothing here carries state.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Letters and digits, optionally joined by dots, whitespace, apostrophes or hyphens
    pub static ref NAME_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9]+(?:[.\s'\-]*[A-Za-z0-9]+)*\.?$").unwrap();

    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_@.#$%&*+\-]{3,}$").unwrap();

    pub static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9._+%-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,6}$").unwrap();

    /// Ten digits, leading digit 6-9
    pub static ref MOBILE_REGEX: Regex = Regex::new(r"^[6789][0-9]{9}$").unwrap();

    pub static ref POSTAL_CODE_REGEX: Regex = Regex::new(r"^[0-9]{6}$").unwrap();

    pub static ref ADDRESS_REGEX: Regex = Regex::new(r"^[A-Za-z0-9\s.,#-]+$").unwrap();

    pub static ref PASSWORD_SPECIAL_REGEX: Regex = Regex::new(r"[@$!%*?&]").unwrap();
}

pub const NAME_BLACKLIST: &[&str] = &[
    "test", "admin", "demo", "sample", "temp", "dummy", "abc", "xyz", "asdf",
];

pub const USERNAME_BLACKLIST: &[&str] = &[
    "test", "admin", "user", "demo", "sample", "temp", "hello", "abc", "test123", "user123",
    "admin123", "password", "qwerty", "asdfgh", "test1234", "testuser", "adminuser", "demouser",
];

pub const EMAIL_BLACKLIST: &[&str] = &[
    "test@test.com",
    "test@example.com",
    "admin@admin.com",
    "user@user.com",
    "demo@demo.com",
    "demo@example.com",
    "sample@sample.com",
    "info@info.com",
    "test@gmail.com",
    "dummy@dummy.com",
    "temp@temp.com",
    "hello@hello.com",
    "abc@abc.com",
    "admin@example.com",
];

pub const PHONE_BLACKLIST: &[&str] = &[
    "1234567890",
    "9999999999",
    "1111111111",
    "5555555555",
    "0000000000",
    "6666666666",
    "7777777777",
    "8888888888",
    "1234567801",
    "9876543210",
];

/// Inclusive character-count bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBounds {
    pub min: usize,
    pub max: usize,
}

impl LengthBounds {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

pub const NAME_SUBMISSION_BOUNDS: LengthBounds = LengthBounds::new(1, 50);
pub const NAME_INTERACTIVE_BOUNDS: LengthBounds = LengthBounds::new(2, 20);
pub const GUARDIAN_NAME_BOUNDS: LengthBounds = LengthBounds::new(2, 100);
pub const USERNAME_BOUNDS: LengthBounds = LengthBounds::new(3, 30);
pub const EMAIL_BOUNDS: LengthBounds = LengthBounds::new(5, 100);
pub const PASSWORD_BOUNDS: LengthBounds = LengthBounds::new(8, 50);
pub const ADDRESS_BOUNDS: LengthBounds = LengthBounds::new(10, 200);
pub const SECURITY_ANSWER_BOUNDS: LengthBounds = LengthBounds::new(2, 100);

pub const PHONE_LENGTH: usize = 10;
pub const POSTAL_CODE_LENGTH: usize = 6;

pub const MIN_BIRTH_YEAR: i32 = 1900;
pub const MINIMUM_AGE: i32 = 13;

/// Date format accepted for dates of birth
pub const DOB_FORMAT: &str = "%Y-%m-%d";

/// Case-insensitive membership test against a blacklist
pub fn is_blacklisted(value: &str, list: &[&str]) -> bool {
    let lowered = value.to_lowercase();
    list.iter().any(|entry| *entry == lowered)
}

/// True when the string is non-empty and every character is the same
pub fn all_same_char(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_regex() {
        assert!(NAME_REGEX.is_match("Alice"));
        assert!(NAME_REGEX.is_match("Mary-Jane O'Neil"));
        assert!(NAME_REGEX.is_match("John Jr."));
        assert!(NAME_REGEX.is_match("Agent47"));
        assert!(!NAME_REGEX.is_match("-Alice"));
        assert!(!NAME_REGEX.is_match("Alice!"));
        assert!(!NAME_REGEX.is_match(""));
    }

    #[test]
    fn test_username_regex() {
        assert!(USERNAME_REGEX.is_match("alice01"));
        assert!(USERNAME_REGEX.is_match("a.b_c@d#e"));
        assert!(!USERNAME_REGEX.is_match("ab"));
        assert!(!USERNAME_REGEX.is_match("has space"));
    }

    #[test]
    fn test_email_regex() {
        assert!(EMAIL_REGEX.is_match("alice01@mail.com"));
        assert!(EMAIL_REGEX.is_match("first.last+tag@sub.example.org"));
        assert!(!EMAIL_REGEX.is_match("no-at-sign.com"));
        assert!(!EMAIL_REGEX.is_match("alice@mail.c"));
        assert!(!EMAIL_REGEX.is_match("alice@mail.abcdefg"));
    }

    #[test]
    fn test_mobile_regex() {
        assert!(MOBILE_REGEX.is_match("9876543211"));
        assert!(MOBILE_REGEX.is_match("6000000001"));
        assert!(!MOBILE_REGEX.is_match("5876543211"));
        assert!(!MOBILE_REGEX.is_match("987654321"));
    }

    #[test]
    fn test_blacklist_is_case_insensitive() {
        assert!(is_blacklisted("ADMIN", USERNAME_BLACKLIST));
        assert!(is_blacklisted("Test@Test.com", EMAIL_BLACKLIST));
        assert!(!is_blacklisted("alice01", USERNAME_BLACKLIST));
    }

    #[test]
    fn test_all_same_char() {
        assert!(all_same_char("111111"));
        assert!(!all_same_char("111112"));
        assert!(!all_same_char(""));
    }
}
