use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ═══════════════════════════════════════════════════════════════════════════
// REGISTRATION TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// A self-registered user as persisted by the storage layer
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RegistrationRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub mobile: String,
    pub dob: NaiveDate,
    pub age: i32,
    pub gender: String,
    pub address: String,
    pub postal_code: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub education: String,
    pub profile_photo: Option<String>,
    pub security_question: String,
    #[serde(skip_serializing)]
    pub security_answer: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub guardian_name: Option<String>,
    pub guardian_email: Option<String>,
    pub guardian_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A fully validated registration, ready to be written
///
/// Built only by the registration orchestrator; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub mobile: String,
    pub dob: NaiveDate,
    pub age: i32,
    pub gender: String,
    pub address: String,
    pub postal_code: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub education: String,
    pub profile_photo: String,
    pub security_question: String,
    pub security_answer: String,
    pub password_hash: String,
    pub guardian_name: Option<String>,
    pub guardian_email: Option<String>,
    pub guardian_phone: Option<String>,
}

/// Dashboard row for the admin listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub mobile: String,
    pub age: i32,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

impl From<&RegistrationRecord> for RegistrationSummary {
    fn from(record: &RegistrationRecord) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            username: record.username.clone(),
            email: record.email.clone(),
            mobile: record.mobile.clone(),
            age: record.age,
            country: record.country.clone(),
            created_at: record.created_at,
        }
    }
}

/// Administrator account; a separate identity space from registrations
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminPrincipal {
    pub id: i64,
    pub admin_username: String,
    pub admin_email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub admin_username: String,
    pub admin_email: String,
    pub password_hash: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// REQUEST / RESPONSE TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// Body of `POST /register`
///
/// Every field is optional at the type level so that a missing key and an
/// empty string are both reported through the same presence check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub education: Option<String>,
    pub password: Option<String>,
    pub security_question: Option<String>,
    pub security_answer: Option<String>,
    pub profile_photo: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_email: Option<String>,
    pub guardian_phone: Option<String>,
}

/// Successful registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user_id: i64,
    pub username: String,
}

/// Body of `POST /api/validate`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateFieldRequest {
    pub field: Option<String>,
    /// Any JSON value; `null` counts as absent
    pub value: Option<serde_json::Value>,
    pub password_value: Option<String>,
}

impl ValidateFieldRequest {
    /// The value as text: strings verbatim, anything else in its JSON form
    pub fn value_text(&self) -> Option<String> {
        match self.value.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Pass/fail answer for a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOutcome {
    pub valid: bool,
    pub message: String,
}

impl FieldOutcome {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// Country, state or city entry served by the location endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso2: Option<String>,
}

impl Location {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            iso2: None,
        }
    }

    pub fn country(id: i64, name: impl Into<String>, iso2: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            iso2: Some(iso2.into()),
        }
    }
}

/// Query parameters for the admin dashboard listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationSearchParams {
    pub page: Option<i64>,
    pub search: Option<String>,
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    #[serde(rename = "pages")]
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            items,
            total,
            page,
            total_pages,
        }
    }
}
