//! Registration orchestrator
//!
//! Runs a submitted form through presence, format, uniqueness, date and age
//! checks in that order, then persists it. The first failing step decides
//! the response.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use shared::{NewRegistration, RegisterRequest, RegistrationRecord};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::metrics;
use crate::password::hash_password;
use crate::storage::{RegistrationStore, StoreError};
use crate::validation::patterns::{DOB_FORMAT, MINIMUM_AGE};
use crate::validation::{age_in_years, check_field, Clock, Field, ValidationContext, Violation, ViolationKind};

/// Fields that must be present and non-blank, in form order
pub const REQUIRED_FIELDS: [Field; 17] = [
    Field::FirstName,
    Field::LastName,
    Field::Username,
    Field::Email,
    Field::Mobile,
    Field::Dob,
    Field::Gender,
    Field::Address,
    Field::PostalCode,
    Field::Country,
    Field::State,
    Field::City,
    Field::Education,
    Field::Password,
    Field::SecurityQuestion,
    Field::SecurityAnswer,
    Field::ProfilePhoto,
];

/// Fields re-validated on submission
const SUBMISSION_CHECKED: [Field; 4] = [Field::Email, Field::Mobile, Field::FirstName, Field::LastName];

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("{}: {message}", .field.label())]
    InvalidFormat { field: Field, message: String },
    #[error("{}: {message}", .field.label())]
    Blacklisted { field: Field, message: String },
    #[error("{}: {message}", .field.label())]
    Gibberish { field: Field, message: String },
    #[error("{} \"{value}\" is already {}", .field.label(), duplicate_verb(.field))]
    Duplicate { field: Field, value: String },
    #[error("Invalid date of birth format")]
    InvalidDate,
    #[error("Must be at least 13 years old to register")]
    Underage { age: i32 },
    #[error("storage failure: {0}")]
    Storage(#[source] StoreError),
}

fn duplicate_verb(field: &Field) -> &'static str {
    match field {
        Field::Email => "registered",
        _ => "taken",
    }
}

impl RegistrationError {
    /// Short label for logs and the `registrations_total` counter
    pub fn outcome(&self) -> &'static str {
        match self {
            RegistrationError::MissingFields(_) => "missing_fields",
            RegistrationError::InvalidFormat { .. } => "invalid_format",
            RegistrationError::Blacklisted { .. } => "blacklisted",
            RegistrationError::Gibberish { .. } => "gibberish",
            RegistrationError::Duplicate { .. } => "duplicate",
            RegistrationError::InvalidDate => "invalid_date",
            RegistrationError::Underage { .. } => "underage",
            RegistrationError::Storage(_) => "storage_error",
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RegistrationError::MissingFields(_) => "MissingFields",
            RegistrationError::InvalidFormat { .. } => "InvalidFormat",
            RegistrationError::Blacklisted { .. } => "Blacklisted",
            RegistrationError::Gibberish { .. } => "Gibberish",
            RegistrationError::Duplicate { .. } => "Duplicate",
            RegistrationError::InvalidDate => "InvalidDate",
            RegistrationError::Underage { .. } => "Underage",
            RegistrationError::Storage(_) => "InternalServerError",
        }
    }
}

impl From<Violation> for RegistrationError {
    fn from(violation: Violation) -> Self {
        let Violation { field, kind, message } = violation;
        match kind {
            ViolationKind::Blacklisted => RegistrationError::Blacklisted { field, message },
            ViolationKind::Gibberish => RegistrationError::Gibberish { field, message },
            _ => RegistrationError::InvalidFormat { field, message },
        }
    }
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { field: "username", value } => RegistrationError::Duplicate {
                field: Field::Username,
                value,
            },
            StoreError::Conflict { field: "email", value } => RegistrationError::Duplicate {
                field: Field::Email,
                value,
            },
            other => RegistrationError::Storage(other),
        }
    }
}

impl IntoResponse for RegistrationError {
    fn into_response(self) -> Response {
        let api_error = match &self {
            RegistrationError::Storage(err) => {
                tracing::error!(error = ?err, "registration storage failure");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    self.error_code(),
                    "An unexpected error occurred",
                )
            }
            _ => ApiError::bad_request(self.error_code(), self.to_string()),
        };
        api_error.into_response()
    }
}

/// What a successful registration hands back
#[derive(Debug, Clone)]
pub struct Registered {
    pub id: i64,
    pub username: String,
    pub age: i32,
}

impl From<&RegistrationRecord> for Registered {
    fn from(record: &RegistrationRecord) -> Self {
        Self {
            id: record.id,
            username: record.username.clone(),
            age: record.age,
        }
    }
}

pub struct Registrar {
    store: Arc<dyn RegistrationStore>,
    clock: Arc<dyn Clock>,
}

impl Registrar {
    pub fn new(store: Arc<dyn RegistrationStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<Registered, RegistrationError> {
        let result = self.try_register(request).await;
        match &result {
            Ok(registered) => {
                metrics::observe_registration("created");
                info!(user_id = registered.id, username = %registered.username, "registration created");
            }
            Err(err) => {
                metrics::observe_registration(err.outcome());
                warn!(outcome = err.outcome(), reason = %err, "registration rejected");
            }
        }
        result
    }

    async fn try_register(&self, request: RegisterRequest) -> Result<Registered, RegistrationError> {
        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .iter()
            .filter(|field| required_value(&request, **field).is_none())
            .map(|field| field.wire_name())
            .collect();
        if !missing.is_empty() {
            return Err(RegistrationError::MissingFields(missing));
        }

        let today = self.clock.today();
        let ctx = ValidationContext::submission(today);
        for field in SUBMISSION_CHECKED {
            check_field(field, value_of(&request, field), &ctx)?;
        }

        let username = value_of(&request, Field::Username);
        let email = value_of(&request, Field::Email);
        if self.store.username_exists(username).await? {
            return Err(RegistrationError::Duplicate {
                field: Field::Username,
                value: username.to_string(),
            });
        }
        if self.store.email_exists(email).await? {
            return Err(RegistrationError::Duplicate {
                field: Field::Email,
                value: email.to_string(),
            });
        }

        let dob = NaiveDate::parse_from_str(value_of(&request, Field::Dob), DOB_FORMAT)
            .map_err(|_| RegistrationError::InvalidDate)?;
        let age = age_in_years(dob, today);
        if age < MINIMUM_AGE {
            return Err(RegistrationError::Underage { age });
        }

        let password_hash = hash_password(value_of(&request, Field::Password));
        let record = self
            .store
            .insert_registration(new_registration(request, dob, age, password_hash))
            .await?;

        Ok(Registered::from(&record))
    }
}

fn field_slot(request: &RegisterRequest, field: Field) -> &Option<String> {
    const NONE: &Option<String> = &None;
    match field {
        Field::FirstName => &request.first_name,
        Field::LastName => &request.last_name,
        Field::Username => &request.username,
        Field::Email => &request.email,
        Field::Mobile => &request.mobile,
        Field::Dob => &request.dob,
        Field::Gender => &request.gender,
        Field::Address => &request.address,
        Field::PostalCode => &request.postal_code,
        Field::Country => &request.country,
        Field::State => &request.state,
        Field::City => &request.city,
        Field::Education => &request.education,
        Field::Password => &request.password,
        Field::SecurityQuestion => &request.security_question,
        Field::SecurityAnswer => &request.security_answer,
        Field::ProfilePhoto => &request.profile_photo,
        Field::GuardianName => &request.guardian_name,
        Field::GuardianEmail => &request.guardian_email,
        Field::GuardianPhone => &request.guardian_phone,
        Field::ConfirmPassword => NONE,
    }
}

fn required_value(request: &RegisterRequest, field: Field) -> Option<&str> {
    field_slot(request, field)
        .as_deref()
        .filter(|value| !value.trim().is_empty())
}

/// Value of a field already known to be present
fn value_of(request: &RegisterRequest, field: Field) -> &str {
    required_value(request, field).unwrap_or_default()
}

fn new_registration(
    request: RegisterRequest,
    dob: NaiveDate,
    age: i32,
    password_hash: String,
) -> NewRegistration {
    NewRegistration {
        first_name: request.first_name.unwrap_or_default(),
        last_name: request.last_name.unwrap_or_default(),
        username: request.username.unwrap_or_default(),
        email: request.email.unwrap_or_default(),
        mobile: request.mobile.unwrap_or_default(),
        dob,
        age,
        gender: request.gender.unwrap_or_default(),
        address: request.address.unwrap_or_default(),
        postal_code: request.postal_code.unwrap_or_default(),
        country: request.country.unwrap_or_default(),
        state: request.state.unwrap_or_default(),
        city: request.city.unwrap_or_default(),
        education: request.education.unwrap_or_default(),
        profile_photo: request.profile_photo.unwrap_or_default(),
        security_question: request.security_question.unwrap_or_default(),
        security_answer: request.security_answer.unwrap_or_default(),
        password_hash,
        guardian_name: request.guardian_name,
        guardian_email: request.guardian_email,
        guardian_phone: request.guardian_phone,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::validation::FixedClock;

    fn registrar(store: Arc<MemoryStore>) -> Registrar {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        Registrar::new(store, Arc::new(FixedClock(today)))
    }

    fn valid_request() -> RegisterRequest {
        RegisterRequest {
            first_name: Some("Alice".into()),
            last_name: Some("Liddell".into()),
            username: Some("alice_01".into()),
            email: Some("alice@mail.com".into()),
            mobile: Some("9876543211".into()),
            dob: Some("2000-01-01".into()),
            gender: Some("female".into()),
            address: Some("42 Baker Street, London".into()),
            postal_code: Some("560001".into()),
            country: Some("India".into()),
            state: Some("Karnataka".into()),
            city: Some("Bangalore".into()),
            education: Some("Bachelors".into()),
            password: Some("Abcdef1!".into()),
            security_question: Some("First pet?".into()),
            security_answer: Some("Fluffy".into()),
            profile_photo: Some("data:image/png;base64,AAAA".into()),
            guardian_name: None,
            guardian_email: None,
            guardian_phone: None,
        }
    }

    #[tokio::test]
    async fn test_valid_submission_is_stored_with_hashed_password() {
        let store = Arc::new(MemoryStore::new());
        let registered = registrar(store.clone()).register(valid_request()).await.unwrap();
        assert_eq!(registered.username, "alice_01");
        assert_eq!(registered.age, 25);

        let record = store.get_registration(registered.id).await.unwrap().unwrap();
        assert_ne!(record.password_hash, "Abcdef1!");
        assert!(crate::password::verify_password("Abcdef1!", &record.password_hash));
    }

    #[tokio::test]
    async fn test_missing_fields_are_listed_in_form_order() {
        let store = Arc::new(MemoryStore::new());
        let request = RegisterRequest {
            mobile: Some("   ".into()),
            profile_photo: None,
            ..valid_request()
        };
        let err = registrar(store).register(request).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: mobile, profilePhoto");
    }

    #[tokio::test]
    async fn test_format_checks_run_before_uniqueness() {
        let store = Arc::new(MemoryStore::new());
        let registrar = registrar(store);
        registrar.register(valid_request()).await.unwrap();

        let request = RegisterRequest {
            email: Some("alice@gmail.comcom".into()),
            ..valid_request()
        };
        let err = registrar.register(request).await.unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::InvalidFormat { field: Field::Email, .. }
        ));
        assert!(err.to_string().contains("Invalid domain extension"));
    }

    #[tokio::test]
    async fn test_duplicates_are_rejected() {
        let store = Arc::new(MemoryStore::new());
        let registrar = registrar(store.clone());
        registrar.register(valid_request()).await.unwrap();

        let same_username = RegisterRequest {
            email: Some("other@mail.com".into()),
            ..valid_request()
        };
        let err = registrar.register(same_username).await.unwrap_err();
        assert_eq!(err.to_string(), "Username \"alice_01\" is already taken");

        let same_email = RegisterRequest {
            username: Some("bob_02".into()),
            ..valid_request()
        };
        let err = registrar.register(same_email).await.unwrap_err();
        assert_eq!(err.to_string(), "Email \"alice@mail.com\" is already registered");
        assert_eq!(store.registration_count().await, 1);
    }

    #[tokio::test]
    async fn test_underage_and_bad_dates() {
        let store = Arc::new(MemoryStore::new());
        let registrar = registrar(store.clone());

        let underage = RegisterRequest {
            dob: Some("2015-01-01".into()),
            ..valid_request()
        };
        let err = registrar.register(underage).await.unwrap_err();
        assert!(matches!(err, RegistrationError::Underage { age: 10 }));
        assert_eq!(err.to_string(), "Must be at least 13 years old to register");

        let garbled = RegisterRequest {
            dob: Some("01/01/2000".into()),
            ..valid_request()
        };
        let err = registrar.register(garbled).await.unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidDate));
        assert_eq!(store.registration_count().await, 0);
    }

    #[tokio::test]
    async fn test_thirteenth_birthday_is_old_enough() {
        let store = Arc::new(MemoryStore::new());
        let request = RegisterRequest {
            dob: Some("2012-06-15".into()),
            ..valid_request()
        };
        let registered = registrar(store).register(request).await.unwrap();
        assert_eq!(registered.age, 13);
    }

    #[test]
    fn test_store_conflicts_map_to_duplicates() {
        let err = RegistrationError::from(StoreError::Conflict {
            field: "email",
            value: "a@b.com".into(),
        });
        assert!(matches!(err, RegistrationError::Duplicate { field: Field::Email, .. }));
    }

    #[test]
    fn test_violation_kinds_map_to_error_variants() {
        let blacklisted = Violation::new(Field::Email, ViolationKind::Blacklisted, "This email is not allowed");
        assert!(matches!(
            RegistrationError::from(blacklisted),
            RegistrationError::Blacklisted { .. }
        ));
        let length = Violation::new(Field::FirstName, ViolationKind::Length, "too long");
        assert!(matches!(
            RegistrationError::from(length),
            RegistrationError::InvalidFormat { .. }
        ));
    }
}
