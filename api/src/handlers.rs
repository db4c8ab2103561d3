use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use shared::{FieldOutcome, RegisterRequest, RegisterResponse, ValidateFieldRequest};

use crate::error::{storage_error, ApiError};
use crate::geo::LocationPayload;
use crate::metrics;
use crate::registration::RegistrationError;
use crate::state::AppState;
use crate::validation::interactive;
use crate::validation::SanitizedJson;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let uptime = state.started_at.elapsed().as_secs();
    let now = chrono::Utc::now().to_rfc3339();

    if state.store.ping().await.is_ok() {
        tracing::debug!(uptime_secs = uptime, "health check passed");
        (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
                "timestamp": now,
                "uptime_secs": uptime
            })),
        )
    } else {
        tracing::warn!(uptime_secs = uptime, "health check degraded, storage unreachable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "version": env!("CARGO_PKG_VERSION"),
                "timestamp": now,
                "uptime_secs": uptime
            })),
        )
    }
}

/// Submit a complete registration form
pub async fn register(
    State(state): State<AppState>,
    SanitizedJson(req): SanitizedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), RegistrationError> {
    let registered = state.registrar.register(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "Registration successful!".to_string(),
            user_id: registered.id,
            username: registered.username,
        }),
    ))
}

/// Live check of one field while the user types
pub async fn validate_field(
    State(state): State<AppState>,
    SanitizedJson(req): SanitizedJson<ValidateFieldRequest>,
) -> Result<(StatusCode, Json<FieldOutcome>), ApiError> {
    let value = req.value_text();
    let (Some(field), Some(value)) = (req.field.filter(|f| !f.is_empty()), value) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(FieldOutcome::rejected("Field and value are required")),
        ));
    };

    let outcome = interactive::evaluate(
        state.store.as_ref(),
        &field,
        &value,
        req.password_value.as_deref(),
        state.clock.today(),
    )
    .await
    .map_err(|err| storage_error("field uniqueness lookup", err))?;

    Ok((StatusCode::OK, Json(outcome)))
}

pub async fn list_countries(State(state): State<AppState>) -> Json<LocationPayload> {
    Json(state.locations.countries().await)
}

pub async fn list_states(
    State(state): State<AppState>,
    Path(country_id): Path<i64>,
) -> Json<LocationPayload> {
    Json(state.locations.states(country_id).await)
}

pub async fn list_cities(
    State(state): State<AppState>,
    Path((country_id, state_id)): Path<(i64, i64)>,
) -> Json<LocationPayload> {
    Json(state.locations.cities(country_id, state_id).await)
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let body = metrics::gather_metrics(&state.registry);
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
}

pub async fn route_not_found() -> ApiError {
    ApiError::not_found("RouteNotFound", "The requested resource was not found")
}
