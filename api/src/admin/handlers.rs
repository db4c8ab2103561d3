use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use shared::{PaginatedResponse, RegistrationRecord, RegistrationSearchParams, RegistrationSummary};
use tracing::{info, warn};

use super::export::{export_filename, registrations_csv};
use super::session::{expired_cookie, token_from_headers, AdminContext};
use crate::error::{storage_error, ApiError, ApiResult};
use crate::metrics;
use crate::password::verify_password;
use crate::state::AppState;
use crate::validation::sanitizers::sanitize_optional;
use crate::validation::{Sanitize, SanitizedJson};

pub const PER_PAGE: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Sanitize for AdminLoginRequest {
    fn sanitize(&mut self) {
        sanitize_optional(&mut self.username);
    }
}

pub async fn login(
    State(state): State<AppState>,
    SanitizedJson(req): SanitizedJson<AdminLoginRequest>,
) -> ApiResult<Response> {
    let (Some(username), Some(password)) = (req.username, req.password) else {
        return Err(ApiError::bad_request(
            "InvalidRequest",
            "Username and password are required",
        ));
    };

    let admin = state
        .store
        .find_admin_by_username(&username)
        .await
        .map_err(|err| storage_error("find admin", err))?
        .filter(|admin| verify_password(&password, &admin.password_hash));

    let Some(admin) = admin else {
        metrics::observe_admin_login("rejected");
        warn!(username = %username, "admin login rejected");
        return Err(ApiError::unauthorized("Invalid username or password"));
    };

    let now = Utc::now();
    state
        .store
        .record_admin_login(admin.id, now)
        .await
        .map_err(|err| storage_error("record admin login", err))?;

    let token = state
        .sessions
        .create(AdminContext {
            admin_id: admin.id,
            username: admin.admin_username.clone(),
            logged_in_at: now,
        })
        .await;

    metrics::observe_admin_login("accepted");
    info!(admin_id = admin.id, "admin logged in");

    Ok((
        [(header::SET_COOKIE, state.sessions.cookie(&token))],
        Json(json!({
            "success": true,
            "message": "Login successful",
            "username": admin.admin_username,
        })),
    )
        .into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = token_from_headers(&headers) {
        state.sessions.revoke(&token).await;
    }
    (
        [(header::SET_COOKIE, expired_cookie())],
        Json(json!({ "success": true, "message": "Logged out" })),
    )
        .into_response()
}

pub async fn list_registrations(
    State(state): State<AppState>,
    params: Result<Query<RegistrationSearchParams>, QueryRejection>,
) -> ApiResult<Json<PaginatedResponse<RegistrationSummary>>> {
    let Query(params) = params.map_err(|err| {
        ApiError::bad_request(
            "InvalidQuery",
            format!("Invalid query parameters: {}", err.body_text()),
        )
    })?;
    let page = params.page.unwrap_or(1).max(1);

    let result = state
        .store
        .search_registrations(params.search.as_deref(), page, PER_PAGE)
        .await
        .map_err(|err| storage_error("search registrations", err))?;

    let items = result.records.iter().map(RegistrationSummary::from).collect();
    Ok(Json(PaginatedResponse::new(items, result.total, page, PER_PAGE)))
}

pub async fn get_registration(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<RegistrationRecord>> {
    state
        .store
        .get_registration(id)
        .await
        .map_err(|err| storage_error("get registration", err))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("RegistrationNotFound", format!("No registration with ID: {id}")))
}

pub async fn delete_registration(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let deleted = state
        .store
        .delete_registration(id)
        .await
        .map_err(|err| storage_error("delete registration", err))?;

    if !deleted {
        return Err(ApiError::not_found(
            "RegistrationNotFound",
            format!("No registration with ID: {id}"),
        ));
    }

    info!(registration_id = id, admin = %admin.username, "registration deleted");
    Ok(Json(json!({
        "success": true,
        "message": format!("Registration {id} deleted"),
    })))
}

pub async fn export_csv(State(state): State<AppState>) -> ApiResult<Response> {
    let records = state
        .store
        .all_registrations()
        .await
        .map_err(|err| storage_error("export registrations", err))?;

    let filename = export_filename(Utc::now());
    info!(rows = records.len(), file = %filename, "registrations exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        registrations_csv(&records),
    )
        .into_response())
}
