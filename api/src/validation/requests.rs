//! Sanitization for the request bodies the service accepts

use serde_json::Value;
use shared::{RegisterRequest, ValidateFieldRequest};

use super::extractors::Sanitize;
use super::fields::Field;
use super::sanitizers::{sanitize_in_place, sanitize_optional, sanitize_text};

impl Sanitize for RegisterRequest {
    fn sanitize(&mut self) {
        for value in [
            &mut self.first_name,
            &mut self.last_name,
            &mut self.username,
            &mut self.email,
            &mut self.mobile,
            &mut self.dob,
            &mut self.gender,
            &mut self.address,
            &mut self.postal_code,
            &mut self.country,
            &mut self.state,
            &mut self.city,
            &mut self.education,
            &mut self.security_question,
            &mut self.security_answer,
            &mut self.profile_photo,
        ] {
            sanitize_in_place(value);
        }

        sanitize_optional(&mut self.guardian_name);
        sanitize_optional(&mut self.guardian_email);
        sanitize_optional(&mut self.guardian_phone);
    }
}

impl Sanitize for ValidateFieldRequest {
    fn sanitize(&mut self) {
        sanitize_in_place(&mut self.field);

        let secret = self
            .field
            .as_deref()
            .and_then(|name| name.parse::<Field>().ok())
            .is_some_and(Field::is_secret);
        if !secret {
            if let Some(Value::String(value)) = &mut self.value {
                *value = sanitize_text(value);
            }
        }
    }
}
