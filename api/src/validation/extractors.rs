//! Custom Axum extractor for sanitized input
//!
//! `SanitizedJson<T>` is a drop-in replacement for `Json<T>` that cleans the
//! payload before the handler sees it. Field rules run later, in the
//! handler, because their failures carry registration-specific messages.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Types whose string fields can be cleaned in place
pub trait Sanitize {
    fn sanitize(&mut self);
}

pub struct SanitizedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for SanitizedJson<T>
where
    T: DeserializeOwned + Sanitize + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut data) = Json::<T>::from_request(req, state)
            .await
            .map_err(map_json_rejection)?;
        data.sanitize();
        Ok(SanitizedJson(data))
    }
}

fn map_json_rejection(err: JsonRejection) -> ApiError {
    let message = match err {
        JsonRejection::JsonDataError(e) => format!("Invalid JSON data: {}", e.body_text()),
        JsonRejection::JsonSyntaxError(e) => format!("JSON syntax error: {}", e.body_text()),
        JsonRejection::MissingJsonContentType(_) => {
            "Content-Type must be application/json".to_string()
        }
        JsonRejection::BytesRejection(_) => "Failed to read request body".to_string(),
        _ => "Invalid JSON payload".to_string(),
    };
    ApiError::bad_request("InvalidRequest", message)
}
