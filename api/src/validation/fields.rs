//! Per-field validation rules
//!
//! Each field runs its checks in a fixed order (length, charset, blacklist,
//! gibberish) and stops at the first failure with a message naming the rule.
//! Uniqueness lookups are not done here; see [`super::interactive`] and the
//! registration orchestrator.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use super::age::age_in_years;
use super::gibberish::is_gibberish;
use super::patterns::{
    all_same_char, is_blacklisted, LengthBounds, ADDRESS_BOUNDS, ADDRESS_REGEX, DOB_FORMAT,
    EMAIL_BLACKLIST, EMAIL_BOUNDS, EMAIL_REGEX, GUARDIAN_NAME_BOUNDS, MINIMUM_AGE,
    MIN_BIRTH_YEAR, MOBILE_REGEX, NAME_BLACKLIST, NAME_INTERACTIVE_BOUNDS, NAME_REGEX,
    NAME_SUBMISSION_BOUNDS, PASSWORD_BOUNDS, PASSWORD_SPECIAL_REGEX, PHONE_BLACKLIST,
    PHONE_LENGTH, POSTAL_CODE_LENGTH, POSTAL_CODE_REGEX, SECURITY_ANSWER_BOUNDS, USERNAME_BLACKLIST,
    USERNAME_BOUNDS, USERNAME_REGEX,
};

/// Every field the validation engine knows, by wire name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FirstName,
    LastName,
    GuardianName,
    Username,
    Email,
    GuardianEmail,
    Mobile,
    GuardianPhone,
    Password,
    ConfirmPassword,
    PostalCode,
    Address,
    SecurityAnswer,
    Dob,
    Gender,
    Country,
    State,
    City,
    Education,
    SecurityQuestion,
    ProfilePhoto,
}

impl Field {
    pub const fn wire_name(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::GuardianName => "guardianName",
            Field::Username => "username",
            Field::Email => "email",
            Field::GuardianEmail => "guardianEmail",
            Field::Mobile => "mobile",
            Field::GuardianPhone => "guardianPhone",
            Field::Password => "password",
            Field::ConfirmPassword => "confirmPassword",
            Field::PostalCode => "postalCode",
            Field::Address => "address",
            Field::SecurityAnswer => "securityAnswer",
            Field::Dob => "dob",
            Field::Gender => "gender",
            Field::Country => "country",
            Field::State => "state",
            Field::City => "city",
            Field::Education => "education",
            Field::SecurityQuestion => "securityQuestion",
            Field::ProfilePhoto => "profilePhoto",
        }
    }

    /// Human label used in messages
    pub const fn label(self) -> &'static str {
        match self {
            Field::FirstName => "First name",
            Field::LastName => "Last name",
            Field::GuardianName => "Guardian name",
            Field::Username => "Username",
            Field::Email => "Email",
            Field::GuardianEmail => "Guardian email",
            Field::Mobile => "Mobile number",
            Field::GuardianPhone => "Guardian phone",
            Field::Password => "Password",
            Field::ConfirmPassword => "Password confirmation",
            Field::PostalCode => "Postal code",
            Field::Address => "Address",
            Field::SecurityAnswer => "Security answer",
            Field::Dob => "Date of birth",
            Field::Gender => "Gender",
            Field::Country => "Country",
            Field::State => "State",
            Field::City => "City",
            Field::Education => "Education",
            Field::SecurityQuestion => "Security question",
            Field::ProfilePhoto => "Profile photo",
        }
    }

    /// Fields whose value must not already exist in storage
    pub const fn requires_unique(self) -> bool {
        matches!(self, Field::Username | Field::Email)
    }

    /// Passwords are compared byte for byte and never trimmed
    pub const fn is_secret(self) -> bool {
        matches!(self, Field::Password | Field::ConfirmPassword)
    }

    const ALL: [Field; 21] = [
        Field::FirstName,
        Field::LastName,
        Field::GuardianName,
        Field::Username,
        Field::Email,
        Field::GuardianEmail,
        Field::Mobile,
        Field::GuardianPhone,
        Field::Password,
        Field::ConfirmPassword,
        Field::PostalCode,
        Field::Address,
        Field::SecurityAnswer,
        Field::Dob,
        Field::Gender,
        Field::Country,
        Field::State,
        Field::City,
        Field::Education,
        Field::SecurityQuestion,
        Field::ProfilePhoto,
    ];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.wire_name() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Which rule a value broke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Length,
    Format,
    Blacklisted,
    Gibberish,
    Duplicate,
    Mismatch,
    Missing,
    InvalidDate,
    FutureDate,
    YearRange,
    Underage,
}

/// A failed field check
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Violation {
    pub field: Field,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(field: Field, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            field,
            kind,
            message: message.into(),
        }
    }
}

/// Live feedback or authoritative submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Interactive,
    Submission,
}

/// Cross-field data a check may need
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub password: Option<&'a str>,
    pub today: NaiveDate,
    pub mode: Mode,
}

impl<'a> ValidationContext<'a> {
    pub fn interactive(today: NaiveDate) -> Self {
        Self {
            password: None,
            today,
            mode: Mode::Interactive,
        }
    }

    pub fn submission(today: NaiveDate) -> Self {
        Self {
            password: None,
            today,
            mode: Mode::Submission,
        }
    }

    pub fn with_password(mut self, password: Option<&'a str>) -> Self {
        self.password = password;
        self
    }
}

type Check = Result<String, Violation>;

/// Run every pure rule for `field` and return the success message
pub fn check_field(field: Field, value: &str, ctx: &ValidationContext<'_>) -> Check {
    match field {
        Field::FirstName | Field::LastName | Field::GuardianName => check_name(field, value, ctx),
        Field::Username => check_username(value),
        Field::Email | Field::GuardianEmail => check_email(field, value),
        Field::Mobile | Field::GuardianPhone => check_phone(field, value),
        Field::Password => check_password(value),
        Field::ConfirmPassword => check_confirmation(value, ctx),
        Field::PostalCode => check_postal_code(value),
        Field::Address => check_address(value),
        Field::SecurityAnswer => check_security_answer(value),
        Field::Dob => check_dob(value, ctx.today).map(|_| "Date of birth accepted".to_string()),
        Field::Gender
        | Field::Country
        | Field::State
        | Field::City
        | Field::Education
        | Field::SecurityQuestion => check_selection(field, value),
        Field::ProfilePhoto => check_present(field, value),
    }
}

fn check_length(field: Field, value: &str, bounds: LengthBounds, prefix: &str) -> Result<(), Violation> {
    let len = value.chars().count();
    if len < bounds.min {
        return Err(Violation::new(
            field,
            ViolationKind::Length,
            format!("{prefix}must be at least {} characters", bounds.min),
        ));
    }
    if len > bounds.max {
        return Err(Violation::new(
            field,
            ViolationKind::Length,
            format!("{prefix}must not exceed {} characters", bounds.max),
        ));
    }
    Ok(())
}

fn gibberish_violation(field: Field) -> Violation {
    let message = if field == Field::Password {
        "No repeated patterns allowed in password"
    } else {
        "No gibberish or repeated patterns allowed"
    };
    Violation::new(field, ViolationKind::Gibberish, message)
}

fn check_name(field: Field, value: &str, ctx: &ValidationContext<'_>) -> Check {
    let bounds = match (field, ctx.mode) {
        (Field::GuardianName, _) => GUARDIAN_NAME_BOUNDS,
        (_, Mode::Interactive) => NAME_INTERACTIVE_BOUNDS,
        (_, Mode::Submission) => NAME_SUBMISSION_BOUNDS,
    };
    check_length(field, value, bounds, &format!("{} ", field.label()))?;

    if !NAME_REGEX.is_match(value) {
        return Err(Violation::new(
            field,
            ViolationKind::Format,
            "Only letters, numbers, spaces, dots, apostrophes and hyphens allowed",
        ));
    }
    if !value.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(Violation::new(
            field,
            ViolationKind::Format,
            format!("{} must contain at least one letter", field.label()),
        ));
    }

    if ctx.mode == Mode::Interactive {
        if is_blacklisted(value, NAME_BLACKLIST) {
            return Err(Violation::new(
                field,
                ViolationKind::Blacklisted,
                "This name is not allowed",
            ));
        }
        if is_gibberish(value) {
            return Err(gibberish_violation(field));
        }
    }

    Ok(format!("{} accepted", field.label()))
}

fn check_username(value: &str) -> Check {
    let field = Field::Username;
    check_length(field, value, USERNAME_BOUNDS, "Username ")?;

    if !USERNAME_REGEX.is_match(value) {
        return Err(Violation::new(
            field,
            ViolationKind::Format,
            "Only letters, numbers, and _@.#$%&*+- allowed",
        ));
    }
    if is_blacklisted(value, USERNAME_BLACKLIST) {
        return Err(Violation::new(
            field,
            ViolationKind::Blacklisted,
            "This username is not allowed",
        ));
    }
    if is_gibberish(value) {
        return Err(gibberish_violation(field));
    }

    Ok("Username is available".to_string())
}

fn check_email(field: Field, value: &str) -> Check {
    check_length(field, value, EMAIL_BOUNDS, "Email ")?;

    if !EMAIL_REGEX.is_match(value) {
        return Err(Violation::new(
            field,
            ViolationKind::Format,
            "Enter a valid email address",
        ));
    }

    let Some((local, domain)) = value.split_once('@') else {
        return Err(Violation::new(
            field,
            ViolationKind::Format,
            "Enter a valid email address",
        ));
    };

    if local.contains("..") || domain.contains("..") {
        return Err(Violation::new(
            field,
            ViolationKind::Format,
            "Email cannot contain consecutive dots",
        ));
    }
    if local.starts_with('.') || local.ends_with('.') {
        return Err(Violation::new(
            field,
            ViolationKind::Format,
            "Email cannot start or end with a dot before @",
        ));
    }
    if !local.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(Violation::new(
            field,
            ViolationKind::Format,
            "Email must contain at least one letter before @",
        ));
    }
    if has_repeated_tld(domain) {
        return Err(Violation::new(
            field,
            ViolationKind::Format,
            "Invalid domain extension",
        ));
    }
    if is_blacklisted(value, EMAIL_BLACKLIST) {
        return Err(Violation::new(
            field,
            ViolationKind::Blacklisted,
            "This email is not allowed",
        ));
    }

    let message = if field == Field::GuardianEmail {
        "Guardian email accepted"
    } else {
        "Email format is valid"
    };
    Ok(message.to_string())
}

/// Flags domains like `example.comcom` or `example.com.comcom`
///
/// The trailing label doubled is looked up in the whole domain; a trailing
/// label that is itself a doubled token (`comcom`) is rejected as well.
pub fn has_repeated_tld(domain: &str) -> bool {
    let Some(tld) = domain.rsplit('.').next().filter(|tld| !tld.is_empty()) else {
        return false;
    };

    let doubled = format!("{tld}{tld}");
    if domain.contains(&doubled) {
        return true;
    }

    let lowered = tld.to_ascii_lowercase();
    let len = lowered.len();
    lowered.is_ascii() && len >= 4 && len % 2 == 0 && lowered[..len / 2] == lowered[len / 2..]
}

fn check_phone(field: Field, value: &str) -> Check {
    if value.chars().count() != PHONE_LENGTH {
        return Err(Violation::new(
            field,
            ViolationKind::Length,
            format!("Must be exactly {PHONE_LENGTH} digits"),
        ));
    }
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(Violation::new(
            field,
            ViolationKind::Format,
            "Must contain digits only",
        ));
    }
    if !MOBILE_REGEX.is_match(value) {
        return Err(Violation::new(
            field,
            ViolationKind::Format,
            "Must start with 6, 7, 8, or 9",
        ));
    }
    if is_blacklisted(value, PHONE_BLACKLIST) {
        return Err(Violation::new(
            field,
            ViolationKind::Blacklisted,
            "This number is not allowed",
        ));
    }
    if all_same_char(value) {
        return Err(Violation::new(
            field,
            ViolationKind::Gibberish,
            "Enter a real phone number, not one repeated digit",
        ));
    }

    let message = if field == Field::GuardianPhone {
        "Guardian phone accepted"
    } else {
        "Mobile number accepted"
    };
    Ok(message.to_string())
}

fn check_password(value: &str) -> Check {
    let field = Field::Password;
    check_length(field, value, PASSWORD_BOUNDS, "Password ")?;

    let requirements: [(bool, &str); 4] = [
        (
            value.chars().any(|c| c.is_ascii_uppercase()),
            "Must include at least one uppercase letter",
        ),
        (
            value.chars().any(|c| c.is_ascii_lowercase()),
            "Must include at least one lowercase letter",
        ),
        (
            value.chars().any(|c| c.is_ascii_digit()),
            "Must include at least one number",
        ),
        (
            PASSWORD_SPECIAL_REGEX.is_match(value),
            "Must include at least one special character (@$!%*?&)",
        ),
    ];
    if let Some((_, message)) = requirements.iter().find(|(met, _)| !met) {
        return Err(Violation::new(field, ViolationKind::Format, *message));
    }

    if is_gibberish(value) {
        return Err(gibberish_violation(field));
    }

    Ok("Password is strong".to_string())
}

fn check_confirmation(value: &str, ctx: &ValidationContext<'_>) -> Check {
    let field = Field::ConfirmPassword;
    let password = match ctx.password {
        Some(p) if !p.is_empty() => p,
        _ => {
            return Err(Violation::new(
                field,
                ViolationKind::Missing,
                "Password value is required for confirmation",
            ))
        }
    };
    if value != password {
        return Err(Violation::new(
            field,
            ViolationKind::Mismatch,
            "Passwords do not match",
        ));
    }
    Ok("Passwords match".to_string())
}

fn check_postal_code(value: &str) -> Check {
    let field = Field::PostalCode;
    if value.chars().count() != POSTAL_CODE_LENGTH {
        return Err(Violation::new(
            field,
            ViolationKind::Length,
            format!("Must be exactly {POSTAL_CODE_LENGTH} digits"),
        ));
    }
    if !POSTAL_CODE_REGEX.is_match(value) {
        return Err(Violation::new(
            field,
            ViolationKind::Format,
            "Postal code must contain digits only",
        ));
    }
    if all_same_char(value) {
        return Err(Violation::new(
            field,
            ViolationKind::Gibberish,
            "Postal code cannot be one repeated digit",
        ));
    }
    Ok("Postal code accepted".to_string())
}

fn check_address(value: &str) -> Check {
    let field = Field::Address;
    check_length(field, value, ADDRESS_BOUNDS, "Address ")?;

    if !ADDRESS_REGEX.is_match(value) {
        return Err(Violation::new(
            field,
            ViolationKind::Format,
            "Only letters, numbers, spaces, and .,#- allowed",
        ));
    }
    if is_gibberish(value) {
        return Err(gibberish_violation(field));
    }
    Ok("Address accepted".to_string())
}

fn check_security_answer(value: &str) -> Check {
    let field = Field::SecurityAnswer;
    check_length(field, value, SECURITY_ANSWER_BOUNDS, "Answer ")?;

    if is_gibberish(value) {
        return Err(gibberish_violation(field));
    }
    Ok("Answer accepted".to_string())
}

/// Parse and range-check a date of birth, returning the parsed date
pub fn check_dob(value: &str, today: NaiveDate) -> Result<NaiveDate, Violation> {
    let field = Field::Dob;
    let dob = NaiveDate::parse_from_str(value, DOB_FORMAT).map_err(|_| {
        Violation::new(
            field,
            ViolationKind::InvalidDate,
            "Enter a valid date (YYYY-MM-DD)",
        )
    })?;

    if dob > today {
        return Err(Violation::new(
            field,
            ViolationKind::FutureDate,
            "Date cannot be in the future",
        ));
    }
    if dob.year() < MIN_BIRTH_YEAR || dob.year() > today.year() {
        return Err(Violation::new(
            field,
            ViolationKind::YearRange,
            format!("Year must be between {MIN_BIRTH_YEAR} and {}", today.year()),
        ));
    }
    if age_in_years(dob, today) < MINIMUM_AGE {
        return Err(Violation::new(
            field,
            ViolationKind::Underage,
            format!("Must be at least {MINIMUM_AGE} years old"),
        ));
    }
    Ok(dob)
}

fn check_selection(field: Field, value: &str) -> Check {
    if value.trim().is_empty() {
        return Err(Violation::new(
            field,
            ViolationKind::Missing,
            format!("Please select {}", field.label().to_lowercase()),
        ));
    }
    Ok(format!("{} selected", field.label()))
}

fn check_present(field: Field, value: &str) -> Check {
    if value.trim().is_empty() {
        return Err(Violation::new(
            field,
            ViolationKind::Missing,
            format!("{} is required", field.label()),
        ));
    }
    Ok(format!("{} accepted", field.label()))
}
