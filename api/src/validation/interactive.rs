//! Single-field evaluation behind `POST /api/validate`

use chrono::NaiveDate;
use shared::FieldOutcome;
use tracing::debug;

use super::fields::{check_field, Field, ValidationContext};
use crate::metrics;
use crate::storage::{RegistrationStore, StoreError};

pub const UNKNOWN_FIELD_MESSAGE: &str = "Field accepted";

/// Message shown when a unique field already exists in storage
pub fn duplicate_message(field: Field) -> &'static str {
    match field {
        Field::Email => "Email is already registered",
        _ => "Username is already taken",
    }
}

/// Evaluate one field value the way the form does while the user types.
///
/// Unknown field names are accepted so older clients keep working. The
/// uniqueness lookup runs only once every pure rule has passed.
pub async fn evaluate(
    store: &dyn RegistrationStore,
    field_name: &str,
    value: &str,
    password: Option<&str>,
    today: NaiveDate,
) -> Result<FieldOutcome, StoreError> {
    let Ok(field) = field_name.parse::<Field>() else {
        debug!(field = field_name, "unknown field accepted");
        return Ok(FieldOutcome::accepted(UNKNOWN_FIELD_MESSAGE));
    };

    let ctx = ValidationContext::interactive(today).with_password(password);
    let message = match check_field(field, value, &ctx) {
        Ok(message) => message,
        Err(violation) => {
            metrics::observe_field_validation(field.wire_name(), false);
            return Ok(FieldOutcome::rejected(violation.message));
        }
    };

    let taken = match field {
        Field::Username => store.username_exists(value).await?,
        Field::Email => store.email_exists(value).await?,
        _ => false,
    };
    metrics::observe_field_validation(field.wire_name(), !taken);
    if taken {
        return Ok(FieldOutcome::rejected(duplicate_message(field)));
    }

    Ok(FieldOutcome::accepted(message))
}
